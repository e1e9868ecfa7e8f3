use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which dataset vocabulary a chart family consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DatasetKind {
    Category,
    Pie,
    Xy,
    Xyz,
}

impl DatasetKind {
    /// Dataset selection by raw tag, done before the tag is validated. Unknown tags read a
    /// category dataset.
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "PieChart" | "PieChart3D" | "RingChart" => DatasetKind::Pie,
            "ScatterPlot" | "XYAreaChart" | "XYBarChart" | "XYLineChart" => DatasetKind::Xy,
            "BubbleChart" => DatasetKind::Xyz,
            _ => DatasetKind::Category,
        }
    }

    pub fn root_element(self) -> &'static str {
        match self {
            DatasetKind::Category => "CategoryDataset",
            DatasetKind::Pie => "PieDataset",
            DatasetKind::Xy => "XYDataset",
            DatasetKind::Xyz => "XYZDataset",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_element())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartType {
    AreaChart,
    BarChart,
    BarChart3D,
    LineChart,
    LineChart3D,
    MultiplePieChart,
    MultiplePieChart3D,
    PieChart,
    PieChart3D,
    RingChart,
    SpiderWebChart,
    StackedAreaChart,
    StackedBarChart,
    StackedBarChart3D,
    WaterfallChart,
    ScatterPlot,
    XYAreaChart,
    XYBarChart,
    XYLineChart,
    BubbleChart,
}

impl ChartType {
    pub const ALL: [ChartType; 20] = [
        ChartType::AreaChart,
        ChartType::BarChart,
        ChartType::BarChart3D,
        ChartType::LineChart,
        ChartType::LineChart3D,
        ChartType::MultiplePieChart,
        ChartType::MultiplePieChart3D,
        ChartType::PieChart,
        ChartType::PieChart3D,
        ChartType::RingChart,
        ChartType::SpiderWebChart,
        ChartType::StackedAreaChart,
        ChartType::StackedBarChart,
        ChartType::StackedBarChart3D,
        ChartType::WaterfallChart,
        ChartType::ScatterPlot,
        ChartType::XYAreaChart,
        ChartType::XYBarChart,
        ChartType::XYLineChart,
        ChartType::BubbleChart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::AreaChart => "AreaChart",
            ChartType::BarChart => "BarChart",
            ChartType::BarChart3D => "BarChart3D",
            ChartType::LineChart => "LineChart",
            ChartType::LineChart3D => "LineChart3D",
            ChartType::MultiplePieChart => "MultiplePieChart",
            ChartType::MultiplePieChart3D => "MultiplePieChart3D",
            ChartType::PieChart => "PieChart",
            ChartType::PieChart3D => "PieChart3D",
            ChartType::RingChart => "RingChart",
            ChartType::SpiderWebChart => "SpiderWebChart",
            ChartType::StackedAreaChart => "StackedAreaChart",
            ChartType::StackedBarChart => "StackedBarChart",
            ChartType::StackedBarChart3D => "StackedBarChart3D",
            ChartType::WaterfallChart => "WaterfallChart",
            ChartType::ScatterPlot => "ScatterPlot",
            ChartType::XYAreaChart => "XYAreaChart",
            ChartType::XYBarChart => "XYBarChart",
            ChartType::XYLineChart => "XYLineChart",
            ChartType::BubbleChart => "BubbleChart",
        }
    }

    pub fn dataset_kind(self) -> DatasetKind {
        DatasetKind::for_tag(self.as_str())
    }

    /// The supported tags grouped by dataset vocabulary, as shown in "illegal chart type"
    /// messages.
    pub fn supported_list() -> String {
        let group = |kinds: &[DatasetKind]| {
            Self::ALL
                .iter()
                .filter(|t| kinds.contains(&t.dataset_kind()))
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!(
            "CategoryDataset/PieDataset: {}. XYDataset: {}. XYZDataset: {}.",
            group(&[DatasetKind::Category, DatasetKind::Pie]),
            group(&[DatasetKind::Xy]),
            group(&[DatasetKind::Xyz]),
        )
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match.
impl FromStr for ChartType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnsupportedChartType {
                chart_type: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}
