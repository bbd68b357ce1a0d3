//! Bill of material rows.

use frameforge_trim::BodyRef;
use serde::{Deserialize, Serialize};

/// A bill of material: one row per part that could be measured, plus the
/// parts that could not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    /// Measured parts.
    pub rows: Vec<BomRow>,
    /// Parts left out, with the reason.
    pub skipped: Vec<SkippedPart>,
}

/// A part missing from a [`Bom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPart {
    /// The profile or trim.
    pub body: BodyRef,
    /// Why it could not be measured.
    pub error: String,
}

/// One line of a bill of material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRow {
    /// Assembly label.
    pub parent: String,
    /// Part label; grouped rows join their labels with ", ".
    pub label: String,
    /// Catalog family.
    pub family: String,
    /// Catalog size.
    pub size: String,
    /// Material.
    pub material: String,
    /// Length along the profile path (mm).
    pub length: f64,
    /// Start cutting angle.
    pub cut_angle_1: String,
    /// End cutting angle.
    pub cut_angle_2: String,
    /// Whether the part carries an extruded cutout.
    pub cutout: bool,
    /// Approximate weight of one part (kg).
    pub weight: f64,
    /// Number of identical parts.
    pub quantity: usize,
}

impl BomRow {
    fn group_key(&self) -> (&str, &str, &str, &str, i64, &str, &str) {
        (
            self.parent.as_str(),
            self.cut_angle_1.as_str(),
            self.cut_angle_2.as_str(),
            self.family.as_str(),
            (self.length * 10.0).round() as i64,
            self.material.as_str(),
            self.size.as_str(),
        )
    }
}

/// Merge rows that describe the same part.
///
/// Rows match on parent, cutting angles, family, length to 0.1 mm, material
/// and size. A merged row keeps the first row's values, joins the labels and
/// counts the rows. Output is sorted by the same key.
pub fn group_rows(rows: &[BomRow]) -> Vec<BomRow> {
    let mut sorted: Vec<&BomRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.group_key().cmp(&b.group_key()));

    let mut grouped: Vec<BomRow> = Vec::new();
    let mut labels: Vec<Vec<&str>> = Vec::new();
    for row in sorted {
        let same = grouped
            .last()
            .is_some_and(|last| last.group_key() == row.group_key());
        if same {
            if let (Some(last), Some(names)) = (grouped.last_mut(), labels.last_mut()) {
                last.quantity += 1;
                names.push(row.label.as_str());
            }
        } else {
            grouped.push(BomRow {
                quantity: 1,
                ..row.clone()
            });
            labels.push(vec![row.label.as_str()]);
        }
    }
    for (row, names) in grouped.iter_mut().zip(labels) {
        row.label = names.join(", ");
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, length: f64, angles: (&str, &str)) -> BomRow {
        BomRow {
            parent: "Frame".to_string(),
            label: label.to_string(),
            family: "Square Hollow".to_string(),
            size: "40x40x4".to_string(),
            material: "Steel".to_string(),
            length,
            cut_angle_1: angles.0.to_string(),
            cut_angle_2: angles.1.to_string(),
            cutout: false,
            weight: 4.39 * length / 1000.0,
            quantity: 1,
        }
    }

    #[test]
    fn test_identical_rows_merge() {
        let rows = vec![
            row("Post1", 1200.0, ("0.0", "0.0")),
            row("Rail1", 800.0, ("45.0", "45.0")),
            row("Post2", 1200.02, ("0.0", "0.0")),
            row("Rail2", 800.0, ("45.0", "45.0")),
            row("Post3", 1200.0, ("0.0", "*67.5")),
        ];
        let grouped = group_rows(&rows);
        assert_eq!(grouped.len(), 3);

        let posts = grouped.iter().find(|r| r.label.starts_with("Post1")).unwrap();
        assert_eq!(posts.label, "Post1, Post2");
        assert_eq!(posts.quantity, 2);
        assert_eq!(posts.length, 1200.0);

        let rails = grouped.iter().find(|r| r.label.starts_with("Rail")).unwrap();
        assert_eq!(rails.label, "Rail1, Rail2");
        assert_eq!(rails.quantity, 2);
    }

    #[test]
    fn test_length_rounding_separates_rows() {
        let rows = vec![row("A", 500.0, ("0.0", "0.0")), row("B", 500.2, ("0.0", "0.0"))];
        let grouped = group_rows(&rows);
        assert_eq!(grouped.len(), 2);
        assert!(grouped.iter().all(|r| r.quantity == 1));
    }

    #[test]
    fn test_parent_separates_rows() {
        let mut other = row("B", 500.0, ("0.0", "0.0"));
        other.parent = "Gate".to_string();
        let grouped = group_rows(&[row("A", 500.0, ("0.0", "0.0")), other]);
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(group_rows(&[]).is_empty());
    }
}
