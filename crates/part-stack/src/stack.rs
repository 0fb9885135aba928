//! Stacking sub-parts face to face.
//!
//! Every sub-part is built in its own local frame and placed at the frame
//! of a face selected on the previous sub-part, so
//! `placement[k + 1] = placement[k] ∘ face[k]`.

use geom_kernel::KernelSolidHandle;
use part_ops::{select_face, KernelBundle, OpError, SubPart};
use part_types::{FaceSelector, Frame};

use crate::error::{BuildError, BuildWarning};

/// A sub-part together with where it sits in the assembly.
#[derive(Debug, Clone)]
pub struct PlacedPart {
    /// Step name, used in errors and warnings.
    pub name: String,
    /// The sub-part in its own local coordinates.
    pub part: SubPart,
    pub placement: Frame,
}

impl PlacedPart {
    pub fn new(name: &str, part: SubPart, placement: Frame) -> Self {
        Self {
            name: name.to_string(),
            part,
            placement,
        }
    }

    /// A copy of the solid moved to its placement.
    pub fn world_solid(&self, kb: &mut dyn KernelBundle) -> Result<KernelSolidHandle, BuildError> {
        if self.placement.approx_eq(&Frame::identity(), 1e-12) {
            return Ok(self.part.solid.clone());
        }
        kb.transform_solid(&self.part.solid, &self.placement)
            .map_err(|e| BuildError::at(&self.name, e.into()))
    }

    /// Frame of a face on this sub-part, in assembly coordinates.
    pub fn face(&self, kb: &dyn KernelBundle, selector: &FaceSelector) -> Result<Frame, BuildError> {
        let local = select_face(kb.as_introspect(), &self.part, selector)
            .map_err(|e| BuildError::at(&self.name, e))?;
        Ok(self.placement.compose(&local))
    }
}

/// Build a sub-part with `build` and place it on the face of `previous`
/// that `selector` picks.
///
/// The face is resolved before anything is built, so a bad selector
/// leaves the kernel untouched.
pub fn attach<F>(
    kb: &mut dyn KernelBundle,
    previous: &PlacedPart,
    selector: &FaceSelector,
    name: &str,
    build: F,
) -> Result<PlacedPart, BuildError>
where
    F: FnOnce(&mut dyn KernelBundle) -> Result<SubPart, OpError>,
{
    let local = select_face(kb.as_introspect(), &previous.part, selector)
        .map_err(|e| BuildError::at(name, e))?;
    let placement = previous.placement.compose(&local);
    let part = build(kb).map_err(|e| BuildError::at(name, e))?;
    tracing::debug!(
        step = name,
        on = %selector,
        of = %previous.name,
        origin = ?placement.origin(),
        "attached sub-part"
    );
    Ok(PlacedPart::new(name, part, placement))
}

/// An ordered chain of placed sub-parts.
#[derive(Debug, Clone)]
pub struct Stack {
    // never empty
    steps: Vec<PlacedPart>,
}

impl Stack {
    /// Start a stack with `part` at the assembly origin.
    pub fn start(name: &str, part: SubPart) -> Self {
        Self::start_at(name, part, Frame::identity())
    }

    pub fn start_at(name: &str, part: SubPart, placement: Frame) -> Self {
        Self {
            steps: vec![PlacedPart::new(name, part, placement)],
        }
    }

    /// Build the next sub-part on a face of the current last one.
    pub fn attach<F>(
        &mut self,
        kb: &mut dyn KernelBundle,
        selector: &FaceSelector,
        name: &str,
        build: F,
    ) -> Result<&PlacedPart, BuildError>
    where
        F: FnOnce(&mut dyn KernelBundle) -> Result<SubPart, OpError>,
    {
        let next = attach(kb, self.last(), selector, name, build)?;
        self.steps.push(next);
        Ok(self.last())
    }

    pub fn last(&self) -> &PlacedPart {
        &self.steps[self.steps.len() - 1]
    }

    pub fn steps(&self) -> &[PlacedPart] {
        &self.steps
    }

    /// Warnings the sub-parts picked up while being built, by step.
    pub fn warnings(&self) -> Vec<BuildWarning> {
        self.steps
            .iter()
            .flat_map(|s| {
                s.part
                    .diagnostics
                    .warnings
                    .iter()
                    .cloned()
                    .map(|w| BuildWarning::from_op(&s.name, w))
            })
            .collect()
    }

    /// Union every sub-part, placed, into one body. See [`fuse`].
    pub fn fuse(&self, kb: &mut dyn KernelBundle, name: &str) -> Result<SubPart, BuildError> {
        fuse(kb, &self.steps, name)
    }
}

/// Union placed sub-parts into one body in assembly coordinates.
///
/// The body's face registry is the last sub-part's, placed. It carries no
/// diagnostics; collect those with [`Stack::warnings`] first.
pub fn fuse(
    kb: &mut dyn KernelBundle,
    steps: &[PlacedPart],
    name: &str,
) -> Result<SubPart, BuildError> {
    let Some((first, rest)) = steps.split_first() else {
        return Err(BuildError::InvalidParameter {
            step: name.to_string(),
            reason: "nothing to fuse".to_string(),
        });
    };
    let mut fused = first.world_solid(kb)?;
    for step in rest {
        let placed = step.world_solid(kb)?;
        fused = kb
            .boolean_union(&fused, &placed)
            .map_err(|e| BuildError::at(name, e.into()))?;
    }
    tracing::debug!(step = name, parts = steps.len(), "fused sub-parts");
    let last = rest.last().unwrap_or(first);
    Ok(SubPart::new(fused, last.part.faces.placed(&last.placement)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geom_kernel::{ClosedCurve, MockKernel, Profile};
    use part_ops::execute_extrude;

    fn block(kb: &mut dyn KernelBundle, height: f64) -> Result<SubPart, OpError> {
        execute_extrude(
            kb,
            &Profile::new(ClosedCurve::regular_polygon(4.0, 6)),
            &Frame::identity(),
            height,
        )
    }

    #[test]
    fn each_step_sits_on_the_previous_top() {
        let mut kb = MockKernel::new();
        let first = block(&mut kb, 2.0).unwrap();
        let mut stack = Stack::start("a", first);
        stack
            .attach(&mut kb, &FaceSelector::top(), "b", |kb| block(kb, 3.0))
            .unwrap();
        stack
            .attach(&mut kb, &FaceSelector::top(), "c", |kb| block(kb, 4.0))
            .unwrap();

        let origins: Vec<f64> = stack.steps().iter().map(|s| s.placement.origin()[2]).collect();
        assert_eq!(origins.len(), 3);
        assert_relative_eq!(origins[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(origins[2], 5.0, epsilon = 1e-9);

        let top = stack.last().face(&kb, &FaceSelector::top()).unwrap();
        assert_relative_eq!(top.origin()[2], 9.0, epsilon = 1e-9);
    }

    #[test]
    fn bad_selector_builds_nothing() {
        let mut kb = MockKernel::new();
        let first = block(&mut kb, 2.0).unwrap();
        let stack = Stack::start("a", first);
        let before = kb.solid_count();
        let selector = FaceSelector::Named {
            name: part_types::FaceName::Side {
                dir: part_types::SideDir::PosX,
            },
        };
        let err = attach(&mut kb, stack.last(), &selector, "b", |kb| block(kb, 1.0)).unwrap_err();
        assert!(matches!(err, BuildError::FaceSelectionEmpty { ref step, .. } if step == "b"));
        assert_eq!(kb.solid_count(), before);
    }
}
