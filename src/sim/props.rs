//! Collectible props scattered around the arena

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::stickiness::PropTag;

/// How many props of one kind to scatter and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpawn {
    pub tag: PropTag,
    pub min_scale: f32,
    pub max_scale: f32,
    pub spawn_count: u32,
    /// Distance band from the arena centre
    pub min_spawn_range: f32,
    pub max_spawn_range: f32,
}

/// A prop placed in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropInstance {
    pub id: u32,
    pub tag: PropTag,
    pub position: Vec3,
    pub scale: f32,
    /// Colour shader parameter, one of 0.0, 0.1, ..., 0.9
    pub tint: f32,
    /// Offset from the ball centre once stuck
    pub attached: Option<Vec3>,
}

/// All props of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropField {
    pub props: Vec<PropInstance>,
}

impl PropField {
    /// Scatter every spawn group on the ground plane. Same seed, same field.
    pub fn scatter(spawns: &[PropSpawn], seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut props = Vec::new();
        let mut next_id = 1;

        for spawn in spawns {
            for _ in 0..spawn.spawn_count {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let distance = rng.random_range(spawn.min_spawn_range..=spawn.max_spawn_range);
                let scale = rng.random_range(spawn.min_scale..=spawn.max_scale);
                let tint = rng.random_range(0..10) as f32 * 0.1;

                props.push(PropInstance {
                    id: next_id,
                    tag: spawn.tag,
                    position: Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance),
                    scale,
                    tint,
                    attached: None,
                });
                next_id += 1;
            }
        }

        log::info!("Spawned {} props", props.len());
        Self { props }
    }

    pub fn get(&self, id: u32) -> Option<&PropInstance> {
        self.props.iter().find(|p| p.id == id)
    }

    pub fn is_attached(&self, id: u32) -> bool {
        self.get(id).is_some_and(|p| p.attached.is_some())
    }

    /// Stick a prop to the ball. Returns false if unknown or already stuck.
    pub fn attach(&mut self, id: u32, offset: Vec3) -> bool {
        match self.props.iter_mut().find(|p| p.id == id) {
            Some(prop) if prop.attached.is_none() => {
                prop.attached = Some(offset);
                true
            }
            _ => false,
        }
    }

    pub fn attached_count(&self) -> usize {
        self.props.iter().filter(|p| p.attached.is_some()).count()
    }

    /// Loose props within `reach` of a point on the ground plane
    pub fn loose_within(&self, point: Vec3, reach: f32) -> impl Iterator<Item = &PropInstance> {
        self.props.iter().filter(move |p| {
            p.attached.is_none() && crate::flatten_xz(p.position - point).length() <= reach + p.scale * 0.5
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawns() -> Vec<PropSpawn> {
        vec![
            PropSpawn {
                tag: PropTag::Small,
                min_scale: 0.2,
                max_scale: 0.4,
                spawn_count: 30,
                min_spawn_range: 5.0,
                max_spawn_range: 20.0,
            },
            PropSpawn {
                tag: PropTag::Large,
                min_scale: 2.0,
                max_scale: 2.0,
                spawn_count: 4,
                min_spawn_range: 30.0,
                max_spawn_range: 30.0,
            },
        ]
    }

    #[test]
    fn test_scatter_is_deterministic() {
        let a = PropField::scatter(&spawns(), 7);
        let b = PropField::scatter(&spawns(), 7);
        assert_eq!(a.props, b.props);
        let c = PropField::scatter(&spawns(), 8);
        assert_ne!(a.props, c.props);
    }

    #[test]
    fn test_scatter_respects_ranges() {
        let field = PropField::scatter(&spawns(), 42);
        assert_eq!(field.props.len(), 34);
        for prop in &field.props {
            let dist = prop.position.length();
            let (lo, hi, slo, shi) = match prop.tag {
                PropTag::Small => (5.0, 20.0, 0.2, 0.4),
                _ => (30.0, 30.0, 2.0, 2.0),
            };
            assert!(dist >= lo - 1e-3 && dist <= hi + 1e-3, "distance {dist}");
            assert!(prop.scale >= slo && prop.scale <= shi);
            assert_eq!(prop.position.y, 0.0);
            let k = (prop.tint * 10.0).round();
            assert!((0.0..10.0).contains(&k));
        }
        let ids: std::collections::HashSet<u32> = field.props.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), field.props.len());
    }

    #[test]
    fn test_attach_once() {
        let mut field = PropField::scatter(&spawns(), 1);
        assert!(field.attach(1, Vec3::X));
        assert!(!field.attach(1, Vec3::Y));
        assert!(!field.attach(9999, Vec3::Y));
        assert!(field.is_attached(1));
        assert_eq!(field.get(1).and_then(|p| p.attached), Some(Vec3::X));
        assert_eq!(field.attached_count(), 1);
    }
}
