//! Gallery configuration.
//!
//! Defaults match the portfolio page. [`GalleryConfig::from_env`] overlays `FOLIO_*`
//! environment variables; the binary applies its command-line flags on top.

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, GalleryError};
use crate::layout::layout_cache::DEFAULT_CACHE_ENTRIES;
use crate::layout::SpanRules;
use crate::playback::ObserverOptions;

/// Active column configuration of the grid toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GridView {
    One,
    #[default]
    Two,
    Three,
    Four,
}

impl GridView {
    pub const ALL: [GridView; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    pub fn columns(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    pub fn from_columns(columns: u32) -> Result<Self, GalleryError> {
        match columns {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(GalleryError::UnsupportedColumns(other)),
        }
    }
}

impl fmt::Display for GridView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} column grid", self.columns())
    }
}

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub view: GridView,
    /// Pixel height of one unit row
    pub base_row_unit_px: f32,
    pub span_rules: SpanRules,
    pub observer: ObserverOptions,
    /// Number of computed layouts kept per gallery
    pub layout_cache_entries: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            view: GridView::default(),
            base_row_unit_px: 150.0,
            span_rules: SpanRules::default(),
            observer: ObserverOptions::default(),
            layout_cache_entries: DEFAULT_CACHE_ENTRIES,
        }
    }
}

impl GalleryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from defaults plus whatever `lookup` returns for each `FOLIO_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(columns) = parse_var::<u32>(&lookup, "FOLIO_COLUMNS")? {
            config.view = GridView::from_columns(columns).map_err(|e| ConfigError::InvalidValue {
                key: "FOLIO_COLUMNS",
                value: columns.to_string(),
                reason: e.to_string(),
            })?;
        }
        if let Some(unit) = parse_var::<f32>(&lookup, "FOLIO_ROW_UNIT_PX")? {
            config.base_row_unit_px = positive("FOLIO_ROW_UNIT_PX", unit)?;
        }
        if let Some(margin) = parse_var::<f32>(&lookup, "FOLIO_ROOT_MARGIN_PX")? {
            if !margin.is_finite() || margin < 0.0 {
                return Err(invalid("FOLIO_ROOT_MARGIN_PX", margin, "must be >= 0"));
            }
            config.observer.root_margin_px = margin;
        }
        if let Some(entries) = parse_var::<usize>(&lookup, "FOLIO_LAYOUT_CACHE_ENTRIES")? {
            if entries == 0 {
                return Err(invalid("FOLIO_LAYOUT_CACHE_ENTRIES", entries, "must be > 0"));
            }
            config.layout_cache_entries = entries;
        }

        debug!(?config, "Loaded gallery config");
        Ok(config)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn positive(key: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(key, value, "must be > 0"))
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GalleryConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.view, GridView::Two);
        assert_eq!(config.base_row_unit_px, 150.0);
        assert_eq!(config.observer.root_margin_px, 600.0);
        assert_eq!(config.observer.threshold, 0.01);
        assert_eq!(config.layout_cache_entries, DEFAULT_CACHE_ENTRIES);
    }

    #[test]
    fn test_overrides() {
        let config = GalleryConfig::from_lookup(lookup_from(&[
            ("FOLIO_COLUMNS", "4"),
            ("FOLIO_ROW_UNIT_PX", "120"),
            ("FOLIO_ROOT_MARGIN_PX", " 0 "),
            ("FOLIO_LAYOUT_CACHE_ENTRIES", "2"),
        ]))
        .unwrap();
        assert_eq!(config.view, GridView::Four);
        assert_eq!(config.base_row_unit_px, 120.0);
        assert_eq!(config.observer.root_margin_px, 0.0);
        assert_eq!(config.layout_cache_entries, 2);
    }

    #[test]
    fn test_empty_value_keeps_default() {
        let config = GalleryConfig::from_lookup(lookup_from(&[("FOLIO_COLUMNS", "")])).unwrap();
        assert_eq!(config.view, GridView::Two);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("FOLIO_COLUMNS", "5"),
            ("FOLIO_COLUMNS", "two"),
            ("FOLIO_ROW_UNIT_PX", "-3"),
            ("FOLIO_ROOT_MARGIN_PX", "NaN"),
            ("FOLIO_LAYOUT_CACHE_ENTRIES", "0"),
        ] {
            let err = GalleryConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            let ConfigError::InvalidValue { key: reported, .. } = err;
            assert_eq!(reported, key);
        }
    }

    #[test]
    fn test_grid_view_columns() {
        for view in GridView::ALL {
            assert_eq!(GridView::from_columns(view.columns() as u32).unwrap(), view);
        }
        assert!(matches!(
            GridView::from_columns(0),
            Err(GalleryError::UnsupportedColumns(0))
        ));
        assert_eq!(GridView::Three.to_string(), "3 column grid");
    }
}
