//! The procedural decoration of one viewport size.

use rand::Rng;
use sunrise_config::FieldConfig;
use tracing::info;

use crate::cloud::{CloudMass, generate_clouds};
use crate::error::SkyError;
use crate::nebula::generate_nebula_field;
use crate::patch::NebulaPatch;
use crate::starfield::{Star, generate_stars};
use crate::viewport::ViewportExtent;

/// Stars, clouds and the nebula field, always replaced together.
#[derive(Debug, Default)]
pub struct ProceduralFields {
    /// Star set.
    pub stars: Vec<Star>,
    /// Cloud set, each owning its flocks.
    pub clouds: Vec<CloudMass>,
    /// Background nebula patches.
    pub nebula: Vec<NebulaPatch>,
}

impl ProceduralFields {
    /// Generate every field for `viewport`.
    ///
    /// Draw order from the shared stream is stars, clouds, nebula. An empty
    /// viewport yields empty fields.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        viewport: ViewportExtent,
        config: &FieldConfig,
    ) -> Result<Self, SkyError> {
        let stars = generate_stars(rng, viewport, config.star_count, config.twinkle_odds);
        let clouds = generate_clouds(rng, viewport, config.cloud_min, config.cloud_max)?;
        let nebula =
            generate_nebula_field(rng, viewport, config.nebula_count, config.nebula_band_period)?;

        let fields = Self {
            stars,
            clouds,
            nebula,
        };
        info!(
            "Generated {} stars, {} clouds ({} flocks), {} nebula patches for {}x{}",
            fields.stars.len(),
            fields.clouds.len(),
            fields.flock_count(),
            fields.nebula.len(),
            viewport.width,
            viewport.height
        );
        Ok(fields)
    }

    /// Total flocks across all clouds.
    pub fn flock_count(&self) -> usize {
        self.clouds.iter().map(|c| c.flocks().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::DEFAULT_VIEWPORT;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let fields = ProceduralFields::generate(&mut rng, DEFAULT_VIEWPORT, &FieldConfig::default())
            .unwrap();
        assert_eq!(fields.stars.len(), 200);
        assert!((5..=14).contains(&fields.clouds.len()));
        assert_eq!(fields.nebula.len(), 1000);
    }

    #[test]
    fn test_custom_counts() {
        let config = FieldConfig {
            star_count: 10,
            cloud_min: 2,
            cloud_max: 2,
            nebula_count: 30,
            ..FieldConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let fields = ProceduralFields::generate(&mut rng, DEFAULT_VIEWPORT, &config).unwrap();
        assert_eq!(fields.stars.len(), 10);
        assert_eq!(fields.clouds.len(), 2);
        assert_eq!(fields.nebula.len(), 30);
    }

    #[test]
    fn test_empty_viewport() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let fields =
            ProceduralFields::generate(&mut rng, ViewportExtent::new(0, 600), &FieldConfig::default())
                .unwrap();
        assert!(fields.stars.is_empty());
        assert!(fields.clouds.is_empty());
        assert!(fields.nebula.is_empty());
        assert_eq!(fields.flock_count(), 0);
    }
}
