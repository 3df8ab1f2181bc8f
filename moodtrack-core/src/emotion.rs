//! Emotion observations reported by a face-emotion detector
//!
//! A detector reports zero or more [`FaceRecord`]s per frame. Each record
//! carries an [`EmotionObservation`]: an ordered mapping from emotion name to
//! a confidence score. The order is the detector's emission order and is kept
//! intact, including through serde, because it decides ties.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The fixed set of emotion categories a classifier is expected to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    /// Anger
    Angry,
    /// Disgust
    Disgust,
    /// Fear
    Fear,
    /// Happiness
    Happy,
    /// Sadness
    Sad,
    /// Surprise
    Surprise,
    /// No particular emotion
    Neutral,
}

impl EmotionCategory {
    /// All categories in canonical classifier order
    pub const ALL: [EmotionCategory; 7] = [
        EmotionCategory::Angry,
        EmotionCategory::Disgust,
        EmotionCategory::Fear,
        EmotionCategory::Happy,
        EmotionCategory::Sad,
        EmotionCategory::Surprise,
        EmotionCategory::Neutral,
    ];

    /// Lowercase category name as emitted by the classifier
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Angry => "angry",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Happy => "happy",
            EmotionCategory::Sad => "sad",
            EmotionCategory::Surprise => "surprise",
            EmotionCategory::Neutral => "neutral",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
    }

    /// Emoji glyph shown next to the category
    pub fn glyph(&self) -> &'static str {
        match self {
            EmotionCategory::Angry => "😠",
            EmotionCategory::Disgust => "🤢",
            EmotionCategory::Fear => "😨",
            EmotionCategory::Happy => "😄",
            EmotionCategory::Sad => "😢",
            EmotionCategory::Surprise => "😲",
            EmotionCategory::Neutral => "😐",
        }
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (name, score) entry borrowed from an observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionScore<'a> {
    /// Emotion name exactly as the detector reported it
    pub name: &'a str,
    /// Confidence score, nominally in [0, 1]
    pub score: f32,
}

impl EmotionScore<'_> {
    /// Known category for this entry, if any
    pub fn category(&self) -> Option<EmotionCategory> {
        EmotionCategory::from_name(self.name)
    }
}

/// Per-face mapping from emotion name to confidence score
///
/// Scores need not sum to one. Only the arg-max entry is ever consumed by the
/// annotation pipeline, see [`EmotionObservation::top`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionObservation {
    scores: Vec<(String, f32)>,
}

impl EmotionObservation {
    /// Create an empty observation
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_score(mut self, name: impl Into<String>, score: f32) -> Self {
        self.insert(name, score);
        self
    }

    /// Insert or overwrite a score. Overwriting keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, score: f32) {
        let name = name.into();
        match self.scores.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = score,
            None => self.scores.push((name, score)),
        }
    }

    /// Score for an exact emotion name
    pub fn get(&self, name: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, score)| *score)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the observation has no entries
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries in emission order
    pub fn iter(&self) -> impl Iterator<Item = EmotionScore<'_>> {
        self.scores.iter().map(|(name, score)| EmotionScore {
            name: name.as_str(),
            score: *score,
        })
    }

    /// Highest-scoring entry.
    ///
    /// Ties keep the entry emitted first. Non-finite scores never win; an
    /// observation without a single finite score yields `None`.
    pub fn top(&self) -> Option<EmotionScore<'_>> {
        self.iter()
            .filter(|entry| entry.score.is_finite())
            .fold(None, |best, entry| match best {
                Some(best) if best.score >= entry.score => Some(best),
                _ => Some(entry),
            })
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for EmotionObservation {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        let mut observation = Self::new();
        for (name, score) in iter {
            observation.insert(name, score);
        }
        observation
    }
}

impl Serialize for EmotionObservation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for (name, score) in &self.scores {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmotionObservation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObservationVisitor;

        impl<'de> Visitor<'de> for ObservationVisitor {
            type Value = EmotionObservation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of emotion name to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut observation = EmotionObservation::new();
                while let Some((name, score)) = access.next_entry::<String, f32>()? {
                    observation.insert(name, score);
                }
                Ok(observation)
            }
        }

        deserializer.deserialize_map(ObservationVisitor)
    }
}

/// Face bounding box in pixel coordinates, serialized as `[x, y, w, h]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Box width
    pub width: i32,
    /// Box height
    pub height: i32,
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x, y, width, height]: [i32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x, bbox.y, bbox.width, bbox.height]
    }
}

/// One detected face and its emotion scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    /// Where the face was found, when the detector reports it
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Emotion scores for this face
    pub emotions: EmotionObservation,
}

impl FaceRecord {
    /// Create a record without location information
    pub fn new(emotions: EmotionObservation) -> Self {
        Self {
            bounding_box: None,
            emotions,
        }
    }

    /// Attach a bounding box
    pub fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}
