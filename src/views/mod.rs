use serde::Serialize;

pub mod activation;
pub mod comparison;
pub mod radar;
pub mod summary;

pub const PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Instructor,
    Student,
}

impl Role {
    pub fn from_flag(is_instructor: bool) -> Self {
        if is_instructor {
            Role::Instructor
        } else {
            Role::Student
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "chart", rename_all = "snake_case")]
pub enum ChartView<T> {
    Loading,
    Ready(T),
}

impl<T> ChartView<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ChartView::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartView::Ready(chart) => Some(chart),
            ChartView::Loading => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarChart {
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

impl BarChart {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.series.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub stack: String,
    pub data: Vec<BarDatum>,
}

impl BarSeries {
    pub fn stacked(name: &str, data: Vec<BarDatum>) -> Self {
        BarSeries {
            name: name.to_string(),
            stack: "total".to_string(),
            data,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|datum| datum.value).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_activator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BarDatum {
    pub fn plain(value: f64) -> Self {
        BarDatum {
            value,
            is_activator: None,
            label: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadarChart {
    pub indicators: Vec<Indicator>,
    pub series: Vec<RadarSeries>,
    pub student_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub name: String,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSeries {
    pub name: String,
    pub label: String,
    pub values: Vec<f64>,
}

/// Negative scores are "not applicable" sentinels and count as zero.
pub fn clamp_score(value: f64) -> f64 {
    value.max(0.0)
}

pub fn as_percent(value: f64) -> f64 {
    clamp_score(value) * PERCENT
}
