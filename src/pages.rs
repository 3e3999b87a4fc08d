use serde::Serialize;

use crate::error::DashboardError;
use crate::filters;
use crate::session::DashboardSession;
use crate::taxonomy::ModuleKind;
use crate::views::{activation, comparison, radar, summary};
use crate::views::{BarChart, ChartView, RadarChart, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Overview,
    Instructor,
    Student,
}

impl PageKind {
    pub fn name(self) -> &'static str {
        match self {
            PageKind::Overview => "overview",
            PageKind::Instructor => "instructor",
            PageKind::Student => "student",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub course_id: Option<String>,
    pub user_id: Option<String>,
    pub is_instructor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Filters,
    Window,
    Actions,
    Cohort,
    Activation {
        kind: ModuleKind,
        title: &'static str,
    },
    Radar,
    StudentsComparison,
}

impl Panel {
    pub fn title(&self) -> &'static str {
        match self {
            Panel::Filters => "Date de fin",
            Panel::Window => "Fenêtre flottante",
            Panel::Actions => "Actions actives",
            Panel::Cohort => "Cohorte dynamique",
            Panel::Activation { title, .. } => *title,
            Panel::Radar => "Scores étudiants",
            Panel::StudentsComparison => "Scores cumulés pour toutes les actions",
        }
    }
}

const RESOURCES_RATE: &str = "Taux de consultation des ressources";
const ACTIVITIES_RATE: &str = "Taux d'activation des activités";
const MY_RESOURCES: &str = "Mon avancement de consultation des ressources";

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    kind: PageKind,
    course_id: String,
    user_id: Option<String>,
    role: Role,
    panels: Vec<Panel>,
}

/// Builds the panel set for `kind`. A missing course context is fatal for
/// the page.
pub fn compose(kind: PageKind, viewer: &Viewer) -> Result<Page, DashboardError> {
    let course_id = viewer
        .course_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(DashboardError::MissingCourseContext { page: kind.name() })?;

    let resources = Panel::Activation {
        kind: ModuleKind::Resource,
        title: RESOURCES_RATE,
    };
    let activities = Panel::Activation {
        kind: ModuleKind::Activity,
        title: ACTIVITIES_RATE,
    };

    let (role, panels) = match kind {
        PageKind::Overview => (
            Role::from_flag(viewer.is_instructor),
            vec![
                Panel::Filters,
                Panel::Window,
                Panel::Actions,
                Panel::Cohort,
                resources,
                activities,
                Panel::Radar,
                Panel::StudentsComparison,
            ],
        ),
        PageKind::Instructor => (
            Role::Instructor,
            vec![
                Panel::Filters,
                Panel::Window,
                resources,
                activities,
                Panel::Radar,
                Panel::StudentsComparison,
            ],
        ),
        PageKind::Student => (
            Role::Student,
            vec![
                Panel::Filters,
                Panel::Window,
                Panel::Activation {
                    kind: ModuleKind::Resource,
                    title: MY_RESOURCES,
                },
                Panel::Radar,
            ],
        ),
    };

    Ok(Page {
        kind,
        course_id: course_id.to_string(),
        user_id: viewer.user_id.clone(),
        role,
        panels,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelContent {
    Filters { until: String, max: String },
    Text { value: String },
    Bar { chart: ChartView<BarChart> },
    Radar { chart: ChartView<RadarChart> },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPanel {
    pub title: &'static str,
    #[serde(flatten)]
    pub content: PanelContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub page: PageKind,
    pub course_id: String,
    pub until: String,
    pub panels: Vec<RenderedPanel>,
}

fn chart_or_error<T>(
    result: Result<ChartView<T>, DashboardError>,
    wrap: fn(ChartView<T>) -> PanelContent,
) -> PanelContent {
    match result {
        Ok(chart) => wrap(chart),
        Err(err) => PanelContent::Error {
            message: err.to_string(),
        },
    }
}

impl Page {
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Renders every panel against the session's committed data. `student`
    /// is the radar selection; students default to themselves.
    pub fn render(&self, session: &DashboardSession, student: Option<&str>) -> RenderedPage {
        let snapshot = session.window();
        let scores = session.scores();
        let own_id = match self.role {
            Role::Student => self.user_id.as_deref(),
            Role::Instructor => None,
        };
        let selected = student.or(own_id);

        let panels = self
            .panels
            .iter()
            .map(|panel| {
                let content = match panel {
                    Panel::Filters => PanelContent::Filters {
                        until: session.filter().until().to_rfc3339(),
                        max: filters::max_selectable().to_rfc3339(),
                    },
                    Panel::Window => PanelContent::Text {
                        value: summary::window_range(snapshot),
                    },
                    Panel::Actions => PanelContent::Text {
                        value: summary::actions_count(snapshot),
                    },
                    Panel::Cohort => PanelContent::Text {
                        value: summary::cohort_size(snapshot),
                    },
                    Panel::Activation { kind, .. } => chart_or_error(
                        activation::build(snapshot, *kind, own_id, self.role),
                        |chart| PanelContent::Bar { chart },
                    ),
                    Panel::Radar => chart_or_error(radar::build(snapshot, scores, selected), |chart| {
                        PanelContent::Radar { chart }
                    }),
                    Panel::StudentsComparison => {
                        chart_or_error(comparison::build(scores), |chart| PanelContent::Bar { chart })
                    }
                };
                RenderedPanel {
                    title: panel.title(),
                    content,
                }
            })
            .collect();

        RenderedPage {
            page: self.kind,
            course_id: self.course_id.clone(),
            until: filters::format_wire_date(session.filter().until_date()),
            panels,
        }
    }
}
