use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub iri: String,
    pub name: String,
    pub module_type: String,
    #[serde(default)]
    pub activation_date: Option<NaiveDate>,
    pub activation_rate: f64,
    #[serde(default)]
    pub activation_students: Vec<String>,
}

impl Action {
    pub fn is_activated_by(&self, student: &str) -> bool {
        self.activation_students.iter().any(|id| id == student)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidingWindow {
    pub window: Window,
    #[serde(default)]
    pub active_actions: Option<Vec<Action>>,
    #[serde(default)]
    pub dynamic_cohort: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentScores {
    pub student: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub actions: Vec<Action>,
    /// Keeps the order in which the service listed students.
    #[serde(
        serialize_with = "serialize_student_scores",
        deserialize_with = "deserialize_student_scores"
    )]
    pub scores: Vec<StudentScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<Vec<f64>>,
}

impl Scores {
    pub fn student(&self, student: &str) -> Option<&[f64]> {
        self.scores
            .iter()
            .find(|entry| entry.student == student)
            .map(|entry| entry.values.as_slice())
    }

    pub fn students(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|entry| entry.student.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ScoresOptions {
    pub totals: bool,
    pub average: bool,
}

fn serialize_student_scores<S>(scores: &[StudentScores], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(scores.len()))?;
    for entry in scores {
        map.serialize_entry(&entry.student, &entry.values)?;
    }
    map.end()
}

fn deserialize_student_scores<'de, D>(deserializer: D) -> Result<Vec<StudentScores>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedScores;

    impl<'de> Visitor<'de> for OrderedScores {
        type Value = Vec<StudentScores>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of student identifiers to score lists")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut scores = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((student, values)) = access.next_entry::<String, Vec<f64>>()? {
                scores.push(StudentScores { student, values });
            }
            Ok(scores)
        }
    }

    deserializer.deserialize_map(OrderedScores)
}
