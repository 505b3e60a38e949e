//! Light aggregation and uniform change tracking
//!
//! The scene builds a [`LightSet`] of at most [`MAX_LIGHTS`] directional
//! lights per frame. [`LightUniformCache`] remembers what was last uploaded so
//! unchanged light uniforms are not sent again.

use crate::foundation::math::Vec3;

/// Lights consumed per draw
pub const MAX_LIGHTS: usize = 4;

/// Squared distance below which two vectors count as equal
pub const LIGHT_CHANGE_EPSILON_SQ: f32 = 1.0e-12;

/// Direction and radiance of one directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Normalized direction the light travels in
    pub direction: Vec3,
    /// Color multiplied by intensity
    pub color: Vec3,
}

/// Bounded set of directional lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightSet {
    directions: [Vec3; MAX_LIGHTS],
    colors: [Vec3; MAX_LIGHTS],
    count: usize,
}

impl Default for LightSet {
    fn default() -> Self {
        Self {
            directions: [Vec3::zeros(); MAX_LIGHTS],
            colors: [Vec3::zeros(); MAX_LIGHTS],
            count: 0,
        }
    }
}

impl LightSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light; returns `false` once the set is full
    pub fn push(&mut self, light: DirectionalLight) -> bool {
        if self.count == MAX_LIGHTS {
            return false;
        }
        self.directions[self.count] = light.direction;
        self.colors[self.count] = light.color;
        self.count += 1;
        true
    }

    /// Number of lights
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Directions of the stored lights
    pub fn directions(&self) -> &[Vec3] {
        &self.directions[..self.count]
    }

    /// Radiance of the stored lights
    pub fn colors(&self) -> &[Vec3] {
        &self.colors[..self.count]
    }

    /// Light at `index`
    pub fn get(&self, index: usize) -> Option<DirectionalLight> {
        (index < self.count).then(|| DirectionalLight {
            direction: self.directions[index],
            color: self.colors[index],
        })
    }

    /// Iterate the stored lights
    pub fn iter(&self) -> impl Iterator<Item = DirectionalLight> + '_ {
        (0..self.count).filter_map(move |i| self.get(i))
    }

    /// Copy with every direction mapped through `f` and renormalized
    pub fn map_directions(&self, mut f: impl FnMut(Vec3) -> Vec3) -> Self {
        let mut mapped = self.clone();
        for direction in &mut mapped.directions[..self.count] {
            let transformed = f(*direction);
            *direction = transformed.try_normalize(1.0e-6).unwrap_or(transformed);
        }
        mapped
    }
}

fn differs(a: &Vec3, b: &Vec3) -> bool {
    (a - b).norm_squared() > LIGHT_CHANGE_EPSILON_SQ
}

/// Which parts of the light state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightChanges {
    /// Light count changed; everything must be re-sent
    pub count: bool,
    /// At least one direction changed
    pub directions: bool,
    /// At least one color changed
    pub colors: bool,
    /// Camera position changed
    pub camera: bool,
}

impl LightChanges {
    /// Whether anything changed
    pub fn any(&self) -> bool {
        self.count || self.directions || self.colors || self.camera
    }
}

/// Last uploaded light state
#[derive(Debug, Clone, Default)]
pub struct LightUniformCache {
    lights: Option<LightSet>,
    camera_position: Option<Vec3>,
}

impl LightUniformCache {
    /// Compare `lights` and `camera_position` against the cached copy
    pub fn compare(&self, lights: &LightSet, camera_position: Option<Vec3>) -> LightChanges {
        let camera = match (self.camera_position, camera_position) {
            (Some(cached), Some(incoming)) => differs(&cached, &incoming),
            (None, Some(_)) => true,
            _ => false,
        };

        let Some(cached) = &self.lights else {
            return LightChanges { count: true, directions: true, colors: true, camera };
        };
        if cached.len() != lights.len() {
            return LightChanges { count: true, directions: true, colors: true, camera };
        }

        LightChanges {
            count: false,
            directions: cached.directions().iter().zip(lights.directions()).any(|(a, b)| differs(a, b)),
            colors: cached.colors().iter().zip(lights.colors()).any(|(a, b)| differs(a, b)),
            camera,
        }
    }

    /// Compare, then store the incoming state
    pub fn update(&mut self, lights: &LightSet, camera_position: Option<Vec3>) -> LightChanges {
        let changes = self.compare(lights, camera_position);
        if changes.count || changes.directions || changes.colors {
            self.lights = Some(lights.clone());
        }
        if changes.camera {
            self.camera_position = camera_position;
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(direction: Vec3, color: Vec3) -> DirectionalLight {
        DirectionalLight { direction, color }
    }

    fn two_lights() -> LightSet {
        let mut set = LightSet::new();
        set.push(light(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));
        set.push(light(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.5, 0.2, 0.1)));
        set
    }

    #[test]
    fn test_light_set_is_bounded() {
        let mut set = LightSet::new();
        for _ in 0..MAX_LIGHTS {
            assert!(set.push(light(Vec3::x(), Vec3::y())));
        }
        assert!(!set.push(light(Vec3::x(), Vec3::y())));
        assert_eq!(set.len(), MAX_LIGHTS);
    }

    #[test]
    fn test_iter_yields_lights_in_push_order() {
        let set = two_lights();
        let directions: Vec<Vec3> = set.iter().map(|l| l.direction).collect();
        assert_eq!(directions, vec![Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]);
        assert_eq!(set.iter().nth(1).map(|l| l.color), Some(Vec3::new(0.5, 0.2, 0.1)));
        assert_eq!(LightSet::new().iter().count(), 0);
    }

    #[test]
    fn test_first_update_reports_everything() {
        let mut cache = LightUniformCache::default();
        let changes = cache.update(&two_lights(), Some(Vec3::zeros()));
        assert!(changes.count && changes.directions && changes.colors && changes.camera);
    }

    #[test]
    fn test_identical_state_is_unchanged() {
        let mut cache = LightUniformCache::default();
        cache.update(&two_lights(), Some(Vec3::new(1.0, 2.0, 3.0)));
        let changes = cache.update(&two_lights(), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert!(!changes.any());
    }

    #[test]
    fn test_tiny_difference_is_ignored() {
        let mut cache = LightUniformCache::default();
        cache.update(&two_lights(), None);
        let nudged = two_lights().map_directions(|d| d + Vec3::new(1.0e-7, 0.0, 0.0));
        assert!(!cache.update(&nudged, None).any());
    }

    #[test]
    fn test_color_change_only_flags_colors() {
        let mut cache = LightUniformCache::default();
        cache.update(&two_lights(), None);

        let mut recolored = LightSet::new();
        recolored.push(light(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
        recolored.push(light(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.5, 0.2, 0.1)));

        let changes = cache.update(&recolored, None);
        assert!(changes.colors);
        assert!(!changes.directions);
        assert!(!changes.count);
    }

    #[test]
    fn test_count_change_flags_all() {
        let mut cache = LightUniformCache::default();
        cache.update(&two_lights(), None);
        let changes = cache.update(&LightSet::new(), None);
        assert!(changes.count && changes.directions && changes.colors);
    }
}
