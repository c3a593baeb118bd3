pub mod category;
pub mod risk;

pub use category::{Category, NewCategory};
pub use risk::{
    require_scale, NewRisk, NewRiskRecord, Risk, RiskChanges, RiskFilter, RiskLevel, RiskPatch,
    RiskStatus, RiskWithRecommendations, SCALE_MAX, SCALE_MIN,
};
