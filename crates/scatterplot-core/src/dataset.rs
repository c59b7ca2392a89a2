//! Point datasets and projections
//!
//! A [`Dataset`] is the validated point set handed in by the caller. A
//! [`Projection`] is the read-only view of it used for one rendering pass:
//! per-point vectors, the component count, sprite atlas info and the
//! sequences drawn as polylines.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult, ScatterError};

/// Dimensionality of a point set or camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimensions {
    Two,
    Three,
}

impl Dimensions {
    pub fn count(&self) -> usize {
        match self {
            Dimensions::Two => 2,
            Dimensions::Three => 3,
        }
    }

    pub fn is_3d(&self) -> bool {
        matches!(self, Dimensions::Three)
    }
}

impl TryFrom<usize> for Dimensions {
    type Error = ScatterError;

    fn try_from(dimensions: usize) -> Result<Self, Self::Error> {
        match dimensions {
            2 => Ok(Dimensions::Two),
            3 => Ok(Dimensions::Three),
            _ => Err(ScatterError::UnsupportedDimensions { dimensions }),
        }
    }
}

/// A metadata value attached to a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Number(n) => write!(f, "{}", n),
            MetadataValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

/// Key/value metadata for a single point
pub type PointMetadata = BTreeMap<String, MetadataValue>;

/// Sprite atlas description: an image reference and the size of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteMetadata {
    /// Image reference (URL or path), owned by the caller
    pub sprite_image: Option<String>,
    /// Width and height of a single sprite in the atlas
    pub single_sprite_size: [u32; 2],
}

/// An ordered run of point indices drawn as one polyline
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sequence {
    pub point_indices: Vec<usize>,
}

impl Sequence {
    pub fn new(point_indices: Vec<usize>) -> Self {
        Self { point_indices }
    }

    /// Number of line segments in this polyline
    pub fn segment_count(&self) -> usize {
        self.point_indices.len().saturating_sub(1)
    }
}

/// A validated set of 2D or 3D points with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    points: Vec<Vec<f64>>,
    metadata: Vec<PointMetadata>,
    dimensions: Dimensions,
    pub sprite_metadata: Option<SpriteMetadata>,
    pub sequences: Vec<Sequence>,
}

impl Dataset {
    /// Build a dataset, failing when points disagree on dimensionality.
    ///
    /// `metadata` may be empty; otherwise it must have one entry per point.
    /// An empty point list is accepted and reports three dimensions.
    pub fn new(points: Vec<Vec<f64>>, metadata: Vec<PointMetadata>) -> DatasetResult<Self> {
        let dimensions = match points.first() {
            None => Dimensions::Three,
            Some(first) => match first.len() {
                2 => Dimensions::Two,
                3 => Dimensions::Three,
                dimensions => return Err(DatasetError::UnsupportedDimensions { dimensions }),
            },
        };

        let expected = dimensions.count();
        if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| p.len() != expected) {
            return Err(DatasetError::DimensionMismatch {
                index,
                expected,
                actual: point.len(),
            });
        }

        if !metadata.is_empty() && metadata.len() != points.len() {
            return Err(DatasetError::MetadataLength {
                points: points.len(),
                metadata: metadata.len(),
            });
        }

        Ok(Self {
            points,
            metadata,
            dimensions,
            sprite_metadata: None,
            sequences: Vec::new(),
        })
    }

    /// Build a dataset from separate coordinate columns (z optional).
    ///
    /// Every column must have the same length.
    pub fn from_columns(x: &[f64], y: &[f64], z: Option<&[f64]>, metadata: Vec<PointMetadata>) -> DatasetResult<Self> {
        let columns = [Some(y), z];
        if let Some(column) = columns.into_iter().flatten().find(|c| c.len() != x.len()) {
            return Err(DatasetError::ColumnLength {
                expected: x.len(),
                actual: column.len(),
            });
        }
        let points = match z {
            Some(z) => x
                .iter()
                .zip(y)
                .zip(z)
                .map(|((x, y), z)| vec![*x, *y, *z])
                .collect(),
            None => x.iter().zip(y).map(|(x, y)| vec![*x, *y]).collect(),
        };
        Self::new(points, metadata)
    }

    pub fn with_sprite_metadata(mut self, sprite_metadata: SpriteMetadata) -> Self {
        self.sprite_metadata = Some(sprite_metadata);
        self
    }

    pub fn with_sequences(mut self, sequences: Vec<Sequence>) -> Self {
        self.sequences = sequences;
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<&[f64]> {
        self.points.get(index).map(Vec::as_slice)
    }

    pub fn metadata(&self, index: usize) -> Option<&PointMetadata> {
        self.metadata.get(index)
    }
}

/// One point as seen by a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Index of the point in the source dataset
    pub index: usize,
    /// Projected coordinates (2 or 3 components)
    pub vector: Vec<f64>,
    pub metadata: PointMetadata,
}

/// Sprite atlas information carried by a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteAndMetadataInfo {
    pub sprite_image: Option<String>,
    pub sprite_metadata: Option<SpriteMetadata>,
}

/// The per-point vectors used for one rendering pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub points: Vec<ProjectedPoint>,
    pub components: Dimensions,
    pub sprite_and_metadata_info: Option<SpriteAndMetadataInfo>,
    pub sequences: Vec<Sequence>,
}

impl Projection {
    pub fn new(points: Vec<ProjectedPoint>, components: Dimensions) -> Self {
        Self {
            points,
            components,
            sprite_and_metadata_info: None,
            sequences: Vec::new(),
        }
    }

    /// Project every dataset point using its own coordinates
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let points = dataset
            .points
            .iter()
            .enumerate()
            .map(|(index, vector)| ProjectedPoint {
                index,
                vector: vector.clone(),
                metadata: dataset.metadata(index).cloned().unwrap_or_default(),
            })
            .collect();

        let sprite_and_metadata_info = dataset.sprite_metadata.as_ref().map(|sprite| SpriteAndMetadataInfo {
            sprite_image: sprite.sprite_image.clone(),
            sprite_metadata: Some(sprite.clone()),
        });

        Self {
            points,
            components: dataset.dimensions(),
            sprite_and_metadata_info,
            sequences: dataset.sequences.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinate `axis` of point `index`, 0 when the component is missing
    pub fn coordinate(&self, index: usize, axis: usize) -> f64 {
        self.points
            .get(index)
            .and_then(|p| p.vector.get(axis))
            .copied()
            .unwrap_or(0.0)
    }
}
