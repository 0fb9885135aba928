use geom_kernel::KernelSolidHandle;

/// A labeled group of bodies in an assembly.
#[derive(Debug, Clone)]
pub struct AssemblyGroup {
    pub label: String,
    pub bodies: Vec<KernelSolidHandle>,
}

/// A part ready for export: a root label over ordered, labeled groups of
/// bodies in assembly coordinates.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub label: String,
    pub groups: Vec<AssemblyGroup>,
}

impl Assembly {
    pub fn group_labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    pub fn group(&self, label: &str) -> Option<&AssemblyGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Every body, group by group.
    pub fn bodies(&self) -> impl Iterator<Item = &KernelSolidHandle> {
        self.groups.iter().flat_map(|g| g.bodies.iter())
    }

    pub fn body_count(&self) -> usize {
        self.groups.iter().map(|g| g.bodies.len()).sum()
    }
}

/// Group `(label, body)` pairs under `root_label`. Consecutive pairs with
/// the same label share a group; no geometry is checked.
pub fn assemble<I>(root_label: &str, pairs: I) -> Assembly
where
    I: IntoIterator<Item = (String, KernelSolidHandle)>,
{
    let mut groups: Vec<AssemblyGroup> = Vec::new();
    for (label, body) in pairs {
        match groups.last_mut() {
            Some(group) if group.label == label => group.bodies.push(body),
            _ => groups.push(AssemblyGroup {
                label,
                bodies: vec![body],
            }),
        }
    }
    Assembly {
        label: root_label.to_string(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom_kernel::{ClosedCurve, Kernel, MockKernel, Profile};
    use part_types::Frame;

    fn body(kb: &mut MockKernel) -> KernelSolidHandle {
        let face = kb
            .make_profile_face(&Profile::new(ClosedCurve::circle(1.0)), &Frame::identity())
            .unwrap();
        kb.extrude_face(face, 1.0).unwrap()
    }

    #[test]
    fn consecutive_labels_share_a_group() {
        let mut kb = MockKernel::new();
        let pairs = vec![
            ("base".to_string(), body(&mut kb)),
            ("base".to_string(), body(&mut kb)),
            ("funnel".to_string(), body(&mut kb)),
            ("base".to_string(), body(&mut kb)),
        ];
        let a = assemble("root", pairs);
        assert_eq!(a.label, "root");
        assert_eq!(a.group_labels(), vec!["base", "funnel", "base"]);
        assert_eq!(a.groups[0].bodies.len(), 2);
        assert_eq!(a.body_count(), 4);
        assert_eq!(a.bodies().count(), 4);
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        let a = assemble("root", Vec::new());
        assert!(a.groups.is_empty());
        assert!(a.group("base").is_none());
    }
}
