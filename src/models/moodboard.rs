use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImageUpload;

/// A visual moodboard attached to a project.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Moodboard {
    pub id: i64,
    pub project: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<MoodboardItem>,
    #[serde(default)]
    pub items_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MoodboardInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An image placed on a moodboard canvas. Coordinates are canvas pixels from the top-left.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MoodboardItem {
    pub id: i64,
    pub moodboard: i64,
    pub image: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of an item's geometry.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MoodboardItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl MoodboardItemUpdate {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }
}

/// Upload of a new item. Sent as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct NewMoodboardItem {
    pub moodboard: i64,
    pub image: ImageUpload,
    pub title: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
}

impl NewMoodboardItem {
    /// Where freshly uploaded items land on the canvas.
    pub const DEFAULT_POSITION: (f64, f64) = (100.0, 100.0);

    pub fn new(moodboard: i64, image: ImageUpload, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            moodboard,
            image,
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title
            },
            description: String::new(),
            x: Self::DEFAULT_POSITION.0,
            y: Self::DEFAULT_POSITION.1,
        }
    }
}

/// The visible drawing area of a moodboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pulls a dropped position back inside `[0, width] x [0, height]`.
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (clamp_axis(x, self.width), clamp_axis(y, self.height))
    }
}

fn clamp_axis(value: f64, extent: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, extent.max(0.0))
}
