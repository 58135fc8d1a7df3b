//! Which optional features an event may use.
//!
//! A feature is available when its effective flag is on (override, package
//! or global default) and the host has switched it on in the event's
//! `feature_config`.

use std::collections::{HashMap, HashSet};

use gaestefotos_core::booth::BoothKind;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::event_config::FeatureConfig;
use gaestefotos_core::feature_flags::{keys, package_feature_set, resolve_all, EffectiveFlag};
use gaestefotos_db::models::event::Event;
use gaestefotos_db::models::package::Package;
use gaestefotos_db::repositories::{FeatureFlagRepo, PackageRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct EventFeatures {
    pub config: FeatureConfig,
    pub flags: Vec<EffectiveFlag>,
}

impl EventFeatures {
    pub fn resolve(
        event: &Event,
        package: Option<&Package>,
        defaults: &[(String, bool)],
        overrides: &HashMap<String, bool>,
    ) -> Self {
        let included = package
            .map(|p| package_feature_set(&p.features))
            .unwrap_or_else(HashSet::new);
        Self {
            config: FeatureConfig::from_stored(&event.feature_config),
            flags: resolve_all(defaults, &included, overrides),
        }
    }

    /// Load the event's package and resolve its features.
    pub async fn load(
        pool: &PgPool,
        event: &Event,
    ) -> Result<(Self, Option<Package>), sqlx::Error> {
        let package = match event.package_id {
            Some(id) => PackageRepo::find_by_id(pool, id).await?,
            None => None,
        };
        let defaults = FeatureFlagRepo::defaults(pool).await?;
        let overrides = FeatureFlagRepo::overrides_for_event(pool, event.id).await?;
        let features = Self::resolve(event, package.as_ref(), &defaults, &overrides);
        Ok((features, package))
    }

    /// Effective value of a flag; unknown keys are off.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.iter().any(|f| f.key == key && f.enabled)
    }

    pub fn videos_allowed(&self) -> bool {
        self.config.allow_videos && self.flag(keys::VIDEO_UPLOADS)
    }

    pub fn booth_enabled(&self, kind: BoothKind) -> bool {
        let switch = match kind {
            BoothKind::Drawbot => self.config.drawbot_enabled,
            BoothKind::Spinner => self.config.spinner_enabled,
        };
        switch && self.flag(kind.flag_key())
    }

    pub fn mosaic_enabled(&self) -> bool {
        self.config.mosaic_enabled && self.flag(keys::MOSAIC_WALL)
    }

    /// 403 naming the feature when `enabled` is false.
    pub fn require(enabled: bool, feature: &str) -> AppResult<()> {
        if enabled {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "The '{feature}' feature is not enabled for this event"
            ))))
        }
    }
}
