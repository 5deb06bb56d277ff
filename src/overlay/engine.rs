//! Capped model/market blending.

use crate::config::EngineConfig;
use crate::domain::Overlay;

/// Blend parameters for one market
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayParams {
    pub lambda: f64,
    pub cap: f64,
    pub edge_floor: f64,
    pub large_disagreement_threshold: f64,
}

impl OverlayParams {
    pub fn spread(config: &EngineConfig) -> Self {
        Self {
            lambda: config.lambda_spread,
            cap: config.cap_spread,
            edge_floor: config.edge_floor,
            large_disagreement_threshold: config.large_disagreement_threshold,
        }
    }

    pub fn total(config: &EngineConfig) -> Self {
        Self {
            lambda: config.lambda_total,
            cap: config.cap_total,
            edge_floor: config.edge_floor,
            large_disagreement_threshold: config.large_disagreement_threshold,
        }
    }
}

pub struct OverlayEngine;

impl OverlayEngine {
    /// Blend `model` into `market`.
    ///
    /// A missing model gives a zero, non-actionable overlay. Decisions are
    /// driven by `value_used`; `final_value` is only for audit.
    ///
    /// `params` must come from a validated [`EngineConfig`]: a negative or
    /// NaN cap panics in the clamp.
    pub fn compute(market: f64, model: Option<f64>, params: &OverlayParams) -> Overlay {
        let Some(model) = model else {
            return Overlay {
                market,
                model: None,
                raw_disagreement: None,
                lambda: params.lambda,
                cap: params.cap,
                edge_floor: params.edge_floor,
                raw_value: 0.0,
                value_used: 0.0,
                final_value: market,
                confidence_degraded: false,
                actionable: false,
            };
        };

        let delta = model - market;
        let raw_disagreement = delta.abs();
        let raw_value = params.lambda * delta;
        let value_used = raw_value.clamp(-params.cap, params.cap);

        Overlay {
            market,
            model: Some(model),
            raw_disagreement: Some(raw_disagreement),
            lambda: params.lambda,
            cap: params.cap,
            edge_floor: params.edge_floor,
            raw_value,
            value_used,
            final_value: market + value_used,
            confidence_degraded: raw_disagreement > params.large_disagreement_threshold,
            actionable: value_used.abs() >= params.edge_floor,
        }
    }

    /// Suppression reason when a spread overlay leans to the underdog of a
    /// very large favorite.
    ///
    /// `market_spread` is the favorite-centric line, so a positive overlay
    /// moves toward the underdog.
    pub fn extreme_favorite_guard(
        market_spread: f64,
        overlay: &Overlay,
        threshold: f64,
    ) -> Option<String> {
        if market_spread.abs() >= threshold && overlay.value_used > 0.0 {
            Some(format!(
                "extreme favorite ({market_spread:+.1}): underdog value at this size is unreliable"
            ))
        } else {
            None
        }
    }
}
