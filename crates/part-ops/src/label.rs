//! Engraved text labels.
//!
//! A [`LabelFont`] turns text into planar outlines; the outlines are cut a
//! fixed depth into a face of the part.

use geom_kernel::{ClosedCurve, Profile};
use part_types::Frame;
use std::f64::consts::PI;

use crate::boolean::{subtract_all, TOOL_OVERSHOOT};
use crate::kernel_ext::KernelBundle;
use crate::types::{OpError, SubPart};

/// Text to planar outlines.
pub trait LabelFont {
    /// Outlines for `text` at font size `size`, centered on the origin of
    /// the XY plane. `\n` starts a new line.
    fn outlines(&self, text: &str, size: f64) -> Result<Vec<Profile>, OpError>;
}

/// Built-in block font: every glyph is drawn on a 3x5 grid and each
/// horizontal run of cells becomes one rectangle. Rectangles are inset so
/// that no two of them share an edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockLetters;

const GLYPH_COLS: usize = 3;
const GLYPH_ROWS: usize = 5;
/// Capital height as a fraction of the font size.
const CAP_HEIGHT: f64 = 0.7;
/// Horizontal advance and line pitch, in cells.
const ADVANCE: f64 = 4.0;
const LINE_PITCH: f64 = 7.0;
/// Gap left on every side of a run, in cells.
const INSET: f64 = 0.15;

const GLYPHS: &[(char, [&str; GLYPH_ROWS])] = &[
    ('0', ["###", "#.#", "#.#", "#.#", "###"]),
    ('1', [".#.", "##.", ".#.", ".#.", "###"]),
    ('2', ["###", "..#", "###", "#..", "###"]),
    ('3', ["###", "..#", ".##", "..#", "###"]),
    ('4', ["#.#", "#.#", "###", "..#", "..#"]),
    ('5', ["###", "#..", "###", "..#", "###"]),
    ('6', ["###", "#..", "###", "#.#", "###"]),
    ('7', ["###", "..#", "..#", "..#", "..#"]),
    ('8', ["###", "#.#", "###", "#.#", "###"]),
    ('9', ["###", "#.#", "###", "..#", "###"]),
    ('A', [".#.", "#.#", "###", "#.#", "#.#"]),
    ('B', ["##.", "#.#", "##.", "#.#", "##."]),
    ('C', ["###", "#..", "#..", "#..", "###"]),
    ('D', ["##.", "#.#", "#.#", "#.#", "##."]),
    ('E', ["###", "#..", "##.", "#..", "###"]),
    ('F', ["###", "#..", "##.", "#..", "#.."]),
    ('G', ["###", "#..", "#.#", "#.#", "###"]),
    ('H', ["#.#", "#.#", "###", "#.#", "#.#"]),
    ('I', ["###", ".#.", ".#.", ".#.", "###"]),
    ('J', ["..#", "..#", "..#", "#.#", "###"]),
    ('K', ["#.#", "#.#", "##.", "#.#", "#.#"]),
    ('L', ["#..", "#..", "#..", "#..", "###"]),
    ('M', ["#.#", "###", "###", "#.#", "#.#"]),
    ('N', ["##.", "#.#", "#.#", "#.#", "#.#"]),
    ('O', [".#.", "#.#", "#.#", "#.#", ".#."]),
    ('P', ["###", "#.#", "###", "#..", "#.."]),
    ('Q', ["###", "#.#", "#.#", "###", "..#"]),
    ('R', ["###", "#.#", "##.", "#.#", "#.#"]),
    ('S', ["###", "#..", "###", "..#", "###"]),
    ('T', ["###", ".#.", ".#.", ".#.", ".#."]),
    ('U', ["#.#", "#.#", "#.#", "#.#", "###"]),
    ('V', ["#.#", "#.#", "#.#", "#.#", ".#."]),
    ('W', ["#.#", "#.#", "###", "###", "#.#"]),
    ('X', ["#.#", "#.#", ".#.", "#.#", "#.#"]),
    ('Y', ["#.#", "#.#", ".#.", ".#.", ".#."]),
    ('Z', ["###", "..#", ".#.", "#..", "###"]),
    ('.', ["...", "...", "...", "...", ".#."]),
    ('-', ["...", "...", "###", "...", "..."]),
];

fn glyph(c: char) -> Option<&'static [&'static str; GLYPH_ROWS]> {
    let c = c.to_ascii_uppercase();
    GLYPHS.iter().find(|(g, _)| *g == c).map(|(_, rows)| rows)
}

/// `(start, length)` of each run of filled cells in a glyph row.
fn runs(row: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, filled) in row.chars().map(|c| c == '#').chain(std::iter::once(false)).enumerate() {
        match (filled, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    out
}

fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Profile {
    Profile::new(ClosedCurve::Polyline {
        points: vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
    })
}

impl LabelFont for BlockLetters {
    fn outlines(&self, text: &str, size: f64) -> Result<Vec<Profile>, OpError> {
        if !(size > 0.0) {
            return Err(OpError::InvalidParameter {
                reason: format!("label size must be positive, got {}", size),
            });
        }
        let cell = size * CAP_HEIGHT / GLYPH_ROWS as f64;
        let lines: Vec<&str> = text.lines().collect();
        let block_height = (lines.len().max(1) as f64 - 1.0) * LINE_PITCH + GLYPH_ROWS as f64;
        let top = block_height / 2.0;

        let mut out = Vec::new();
        for (li, line) in lines.iter().enumerate() {
            let chars = line.chars().count() as f64;
            let width = (chars * ADVANCE - (ADVANCE - GLYPH_COLS as f64)).max(0.0);
            let baseline_top = top - li as f64 * LINE_PITCH;
            for (ci, c) in line.chars().enumerate() {
                if c == ' ' {
                    continue;
                }
                let Some(rows) = glyph(c) else {
                    tracing::debug!(character = %c, "no block glyph, left blank");
                    continue;
                };
                let pen = ci as f64 * ADVANCE - width / 2.0;
                for (ri, row) in rows.iter().enumerate() {
                    let y1 = baseline_top - ri as f64;
                    for (start, len) in runs(row) {
                        let x0 = pen + start as f64;
                        out.push(rectangle(
                            (x0 + INSET) * cell,
                            (y1 - 1.0 + INSET) * cell,
                            (x0 + len as f64 - INSET) * cell,
                            (y1 - INSET) * cell,
                        ));
                    }
                }
            }
        }
        Ok(out)
    }
}

/// The face frame turned about its normal so that local +Y points up
/// the part's Z axis whenever the face allows it.
pub fn upright(face: &Frame) -> Frame {
    if face.y_axis()[2] < -1e-9 {
        face.compose(&Frame::rotation_about([0.0; 3], [0.0, 0.0, 1.0], PI).unwrap_or_default())
    } else {
        *face
    }
}

/// Engrave `text` `depth` deep into the face at `face` (Z = outward normal).
/// The cutters stand proud of the face by [`TOOL_OVERSHOOT`].
pub fn execute_label(
    kb: &mut dyn KernelBundle,
    part: SubPart,
    face: &Frame,
    font: &dyn LabelFont,
    text: &str,
    size: f64,
    depth: f64,
) -> Result<SubPart, OpError> {
    if !(depth > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("label depth must be positive, got {}", depth),
        });
    }
    let outlines = font.outlines(text, size)?;
    let floor = upright(face).offset_along_normal(-depth);
    let mut tools = Vec::with_capacity(outlines.len());
    for outline in &outlines {
        let f = kb.make_profile_face(outline, &floor)?;
        tools.push(kb.extrude_face(f, depth + TOOL_OVERSHOOT)?);
    }
    tracing::debug!(text, cuts = tools.len(), "engraving label");
    subtract_all(kb, part, &tools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn runs_split_on_gaps() {
        assert_eq!(runs("###"), vec![(0, 3)]);
        assert_eq!(runs("#.#"), vec![(0, 1), (2, 1)]);
        assert_eq!(runs("..."), vec![]);
    }

    #[test]
    fn one_rectangle_per_run() {
        let font = BlockLetters;
        // "1": .#. ##. .#. .#. ### -> five runs
        assert_eq!(font.outlines("1", 3.0).unwrap().len(), 5);
        // lowercase folds to the capital glyph
        assert_eq!(
            font.outlines("mm", 2.0).unwrap(),
            font.outlines("MM", 2.0).unwrap()
        );
        assert!(font.outlines("~", 2.0).unwrap().is_empty());
    }

    #[test]
    fn text_block_is_centered() {
        let outlines = BlockLetters.outlines("OD\n6MM", 2.0).unwrap();
        let (mut lo, mut hi) = ([f64::MAX; 2], [f64::MIN; 2]);
        for p in &outlines {
            for v in p.boundary.vertices() {
                for k in 0..2 {
                    lo[k] = lo[k].min(v[k]);
                    hi[k] = hi[k].max(v[k]);
                }
            }
        }
        assert_relative_eq!(lo[1], -hi[1], epsilon = 1e-9);
        // widest line decides the horizontal extent
        assert_relative_eq!(lo[0], -hi[0], epsilon = 1e-9);
        let cell = 2.0 * CAP_HEIGHT / 5.0;
        assert_relative_eq!(hi[1] - lo[1], cell * (12.0 - 2.0 * INSET), epsilon = 1e-9);
    }

    #[test]
    fn stacked_runs_do_not_touch() {
        // "8" has full rows over split rows in every column pair
        let outlines = BlockLetters.outlines("8", 5.0).unwrap();
        let boxes: Vec<([f64; 2], [f64; 2])> = outlines
            .iter()
            .map(|p| {
                let v = p.boundary.vertices();
                (v[0], v[2])
            })
            .collect();
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                let apart_x = a.1[0] < b.0[0] || b.1[0] < a.0[0];
                let apart_y = a.1[1] < b.0[1] || b.1[1] < a.0[1];
                assert!(apart_x || apart_y, "{:?} touches {:?}", a, b);
            }
        }
    }

    #[test]
    fn upright_flips_downward_frames() {
        let down = Frame::from_origin_normal([0.0, 5.0, 0.0], [0.0, 1.0, 0.0]).unwrap();
        assert!(down.y_axis()[2] < 0.0);
        let up = upright(&down);
        assert_relative_eq!(up.y_axis()[2], 1.0, epsilon = 1e-9);
        assert_relative_eq!(up.z_axis()[1], 1.0, epsilon = 1e-9);
    }
}
