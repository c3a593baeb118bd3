//! Recommendation text for a scored risk.
//!
//! Two renderings exist. [`recommend`] produces the compact form stored on the
//! risk record: the tier's base actions followed by the conditional additions,
//! joined with `"; "`. [`detailed_report`] produces the long multi-section
//! report served on demand and never persisted. Item order is part of the
//! contract for both.

use serde::Serialize;

use crate::models::RiskLevel;
use crate::services::scoring;

/// Separator between items of the compact form.
pub const SEPARATOR: &str = "; ";

const LOW_ACTIONS: &[&str] = &[
    "Monitoreo periódico del riesgo",
    "Documentar en registro de riesgos",
    "Revisar en reuniones trimestrales",
    "Mantener en observación",
];

const MEDIUM_ACTIONS: &[&str] = &[
    "Asignar responsable específico",
    "Definir plan de acción con fechas límite",
    "Monitoreo mensual del riesgo",
    "Establecer indicadores de control (KPIs)",
    "Reportar en reuniones mensuales de equipo",
    "Evaluar controles preventivos",
];

const HIGH_ACTIONS: &[&str] = &[
    "Plan de mitigación inmediato requerido",
    "Asignar recursos y presupuesto específicos",
    "Monitoreo semanal con reportes ejecutivos",
    "Reporte directo a gerencia y stakeholders",
    "Definir triggers de escalamiento claro",
    "Evaluar transferencia del riesgo (seguros)",
    "Desarrollar plan de contingencia detallado",
];

const CRITICAL_ACTIONS: &[&str] = &[
    "¡Acción inmediata requerida!",
    "Escalar a comité de crisis o directiva",
    "Asignar presupuesto de emergencia",
    "Monitoreo diario con reportes ejecutivos",
    "Plan de contingencia activado inmediatamente",
    "Comunicación constante con todos los stakeholders",
    "Considerar evitación completa del riesgo",
    "Reuniones diarias de seguimiento",
];

/// Appended when probability >= 4.
const PREVENTIVE_CONTROLS: &[&str] = &[
    "Implementar controles preventivos inmediatos",
    "Aumentar frecuencia de monitoreo",
    "Capacitar equipo en procedimientos de emergencia",
];

/// Appended when impact >= 4.
const CONTINGENCY_PLANNING: &[&str] = &[
    "Desarrollar plan de contingencia detallado",
    "Identificar recursos alternativos",
    "Establecer comunicaciones de crisis",
];

/// Appended when the score exceeds 15.
const ROOT_CAUSE_ANALYSIS: &str = "Realizar análisis de root cause completo";

/// Appended when probability and impact are both 5.
const MAXIMUM_URGENCY: &[&str] = &[
    "Activación inmediata de protocolo de crisis",
    "Notificación a autoridades si aplica",
    "Asignación de equipo dedicado full-time",
];

const PREVENTIVE_PROBABILITY: i32 = 4;
const CONTINGENCY_IMPACT: i32 = 4;
const ROOT_CAUSE_SCORE: i32 = 15;
const MAXIMUM_SCALE: i32 = 5;
const HIGH_SCORE_REPORT: i32 = 18;

/// Base actions for a tier, in order.
pub fn base_actions(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Low => LOW_ACTIONS,
        RiskLevel::Medium => MEDIUM_ACTIONS,
        RiskLevel::High => HIGH_ACTIONS,
        RiskLevel::Critical => CRITICAL_ACTIONS,
    }
}

/// Conditional additions triggered by probability and impact, in evaluation order.
///
/// The conditions are independent of the tier and of each other.
pub fn conditional_actions(probability: i32, impact: i32) -> Vec<&'static str> {
    let mut actions = Vec::new();

    if probability >= PREVENTIVE_PROBABILITY {
        actions.extend_from_slice(PREVENTIVE_CONTROLS);
    }
    if impact >= CONTINGENCY_IMPACT {
        actions.extend_from_slice(CONTINGENCY_PLANNING);
    }
    if scoring::score(probability, impact) > ROOT_CAUSE_SCORE {
        actions.push(ROOT_CAUSE_ANALYSIS);
    }
    if probability == MAXIMUM_SCALE && impact == MAXIMUM_SCALE {
        actions.extend_from_slice(MAXIMUM_URGENCY);
    }

    actions
}

/// Compact recommendation string stored on the risk record.
pub fn recommend(level: RiskLevel, probability: i32, impact: i32) -> String {
    base_actions(level)
        .iter()
        .copied()
        .chain(conditional_actions(probability, impact))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

const LOW_REPORT_BLOCK: &str = "
• Monitoreo trimestral mediante checklist
• Mantener documentación en registro oficial
• Revisar en reuniones de equipo mensuales
• Evaluar en revisiones periódicas de proceso
";

const MEDIUM_REPORT_BLOCK: &str = "
• Asignar responsable específico con autoridad
• Desarrollar plan de acción con cronograma de 30 días
• Monitoreo mensual con reportes formales
• Establecer KPIs de control específicos
• Incluir en reportes de gestión mensuales
";

const HIGH_REPORT_BLOCK: &str = "
• Plan de mitigación a implementar en máximo 7 días
• Asignar recursos dedicados y presupuesto
• Monitoreo semanal con reportes ejecutivos
• Comunicación directa con alta gerencia
• Desarrollar plan de contingencia operativo
• Evaluar opciones de transferencia de riesgo
";

const CRITICAL_REPORT_BLOCK: &str = "
• ACCIÓN INMEDIATA REQUERIDA (menos de 48 horas)
• Activación de comité de crisis
• Presupuesto de emergencia asignado
• Monitoreo diario con reportes horarios si es necesario
• Plan de contingencia activado inmediatamente
• Comunicación constante con stakeholders clave
• Considerar parada de operaciones si aplica
";

const HIGH_SCORE_REPORT_BLOCK: &str = "
RECOMENDACIONES ADICIONALES POR ALTO PUNTAJE:
---------------------------------------------
• Reunión urgente con comité directivo
• Evaluar parar actividades relacionadas temporalmente
• Notificar a autoridades regulatorias si aplica
• Activar plan de comunicación de crisis
";

const PREVENTIVE_REPORT_BLOCK: &str = "
CONTROLES PREVENTIVOS RECOMENDADOS:
-----------------------------------
• Implementar controles preventivos inmediatos
• Aumentar frecuencia de auditorías
• Capacitación intensiva del personal
• Redundancia en sistemas críticos
";

fn report_block(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => LOW_REPORT_BLOCK,
        RiskLevel::Medium => MEDIUM_REPORT_BLOCK,
        RiskLevel::High => HIGH_REPORT_BLOCK,
        RiskLevel::Critical => CRITICAL_REPORT_BLOCK,
    }
}

/// Long formatted report, generated on demand.
pub fn detailed_report(level: RiskLevel, probability: i32, impact: i32) -> String {
    let score = scoring::score(probability, impact);

    let mut report = format!(
        "
ANÁLISIS DE RIESGO - RECOMENDACIONES ESPECÍFICAS
=============================================

NIVEL DE RIESGO: {level}
PUNTAJE: {score} (Probabilidad: {probability}/5 × Impacto: {impact}/5)
NIVEL DE URGENCIA: {urgency}

RECOMENDACIONES PRINCIPALES:
----------------------------
",
        urgency = level.urgency_label(),
    );

    report.push_str(report_block(level));

    if score > HIGH_SCORE_REPORT {
        report.push_str(HIGH_SCORE_REPORT_BLOCK);
    }
    if probability >= PREVENTIVE_PROBABILITY {
        report.push_str(PREVENTIVE_REPORT_BLOCK);
    }

    report.push_str(&format!(
        "
PRÓXIMOS PASOS SUGERIDOS:
-------------------------
1. Revisar y priorizar recomendaciones
2. Asignar responsables y fechas límite
3. Establecer sistema de monitoreo
4. Programar seguimiento en {horizon}
5. Documentar lecciones aprendidas
",
        horizon = level.follow_up_horizon(),
    ));

    report
}

/// Structured breakdown used by the preview endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationPreview {
    pub risk_level: RiskLevel,
    pub score: i32,
    pub general_recommendations: Vec<String>,
    pub specific_recommendations: Vec<String>,
    pub urgency_level: String,
}

/// Score a probability/impact pair without touching any record.
pub fn preview(probability: i32, impact: i32) -> RecommendationPreview {
    let level = scoring::severity(probability, impact);

    RecommendationPreview {
        risk_level: level,
        score: scoring::score(probability, impact),
        general_recommendations: base_actions(level).iter().map(|s| s.to_string()).collect(),
        specific_recommendations: conditional_actions(probability, impact)
            .into_iter()
            .map(str::to_string)
            .collect(),
        urgency_level: level.urgency_label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_each_tier_has_more_actions_than_the_one_below() {
        let counts: Vec<usize> = RiskLevel::ALL.iter().map(|l| base_actions(*l).len()).collect();
        assert_eq!(counts, vec![4, 6, 7, 8]);
    }

    #[test]
    fn test_low_without_additions_is_exact_base_list() {
        assert_eq!(
            recommend(RiskLevel::Low, 1, 1),
            "Monitoreo periódico del riesgo; Documentar en registro de riesgos; \
             Revisar en reuniones trimestrales; Mantener en observación"
        );
    }

    #[test]
    fn test_maximum_score_triggers_every_addition_in_order() {
        let text = recommend(RiskLevel::Critical, 5, 5);
        let items: Vec<&str> = text.split(SEPARATOR).collect();

        let mut expected: Vec<&str> = CRITICAL_ACTIONS.to_vec();
        expected.extend_from_slice(PREVENTIVE_CONTROLS);
        expected.extend_from_slice(CONTINGENCY_PLANNING);
        expected.push(ROOT_CAUSE_ANALYSIS);
        expected.extend_from_slice(MAXIMUM_URGENCY);

        assert_eq!(items, expected);
        assert_eq!(items.len(), 18);
    }

    #[test]
    fn test_high_probability_only() {
        // 4 x 2 = 8: MEDIUM, preventive controls only
        let text = recommend(RiskLevel::Medium, 4, 2);
        assert!(text.ends_with(
            "Evaluar controles preventivos; Implementar controles preventivos inmediatos; \
             Aumentar frecuencia de monitoreo; Capacitar equipo en procedimientos de emergencia"
        ));
        assert!(!text.contains("recursos alternativos"));
        assert!(!text.contains("root cause"));
    }

    #[test]
    fn test_high_impact_only() {
        // 2 x 4 = 8
        let additions = conditional_actions(2, 4);
        assert_eq!(additions, CONTINGENCY_PLANNING.to_vec());
    }

    #[test]
    fn test_root_cause_threshold_is_strict() {
        // 4 x 4 = 16 > 15
        assert!(conditional_actions(4, 4).contains(&ROOT_CAUSE_ANALYSIS));
        // 3 x 5 = 15
        assert!(!conditional_actions(3, 5).contains(&ROOT_CAUSE_ANALYSIS));
    }

    #[test]
    fn test_additions_ignore_tier() {
        // caller-supplied tier does not gate the conditional additions
        let text = recommend(RiskLevel::Low, 5, 5);
        assert!(text.starts_with("Monitoreo periódico del riesgo"));
        assert!(text.contains("Asignación de equipo dedicado full-time"));
    }

    #[test]
    fn test_detailed_report_low_is_exact() {
        let expected = "
ANÁLISIS DE RIESGO - RECOMENDACIONES ESPECÍFICAS
=============================================

NIVEL DE RIESGO: LOW
PUNTAJE: 1 (Probabilidad: 1/5 × Impacto: 1/5)
NIVEL DE URGENCIA: BAJA URGENCIA

RECOMENDACIONES PRINCIPALES:
----------------------------

• Monitoreo trimestral mediante checklist
• Mantener documentación en registro oficial
• Revisar en reuniones de equipo mensuales
• Evaluar en revisiones periódicas de proceso

PRÓXIMOS PASOS SUGERIDOS:
-------------------------
1. Revisar y priorizar recomendaciones
2. Asignar responsables y fechas límite
3. Establecer sistema de monitoreo
4. Programar seguimiento en 30 días
5. Documentar lecciones aprendidas
";
        assert_eq!(detailed_report(RiskLevel::Low, 1, 1), expected);
    }

    #[test]
    fn test_detailed_report_critical_sections() {
        let report = detailed_report(RiskLevel::Critical, 5, 5);
        assert!(report.contains("PUNTAJE: 25 (Probabilidad: 5/5 × Impacto: 5/5)"));
        assert!(report.contains("NIVEL DE URGENCIA: URGENCIA CRÍTICA"));
        assert!(report.contains("ACCIÓN INMEDIATA REQUERIDA"));

        let high_score = report.find("RECOMENDACIONES ADICIONALES POR ALTO PUNTAJE").unwrap();
        let preventive = report.find("CONTROLES PREVENTIVOS RECOMENDADOS").unwrap();
        let next_steps = report.find("PRÓXIMOS PASOS SUGERIDOS").unwrap();
        assert!(high_score < preventive && preventive < next_steps);
        assert!(report.contains("Programar seguimiento en 24 horas"));
    }

    #[test]
    fn test_detailed_report_block_triggers() {
        // 4 x 4 = 16: preventive block but no high-score block
        let report = detailed_report(RiskLevel::High, 4, 4);
        assert!(report.contains("CONTROLES PREVENTIVOS RECOMENDADOS"));
        assert!(!report.contains("ALTO PUNTAJE"));
        assert!(report.contains("Programar seguimiento en 7 días"));

        // 3 x 5 = 15, probability below 4
        let report = detailed_report(RiskLevel::High, 3, 5);
        assert!(!report.contains("CONTROLES PREVENTIVOS"));

        let report = detailed_report(RiskLevel::Medium, 2, 3);
        assert!(report.contains("Programar seguimiento en 15 días"));
        assert!(report.contains("NIVEL DE URGENCIA: URGENCIA MODERADA"));
    }

    #[test]
    fn test_preview_splits_general_and_specific() {
        let preview = preview(4, 5);
        assert_eq!(preview.risk_level, RiskLevel::High);
        assert_eq!(preview.score, 20);
        assert_eq!(preview.general_recommendations.len(), HIGH_ACTIONS.len());
        assert_eq!(preview.specific_recommendations.len(), 7);
        assert_eq!(preview.urgency_level, "ALTA URGENCIA");
    }

    proptest! {
        #[test]
        fn prop_base_list_is_prefix(p in 1i32..=5, i in 1i32..=5) {
            let level = scoring::severity(p, i);
            let text = recommend(level, p, i);
            let items: Vec<&str> = text.split(SEPARATOR).collect();
            let base = base_actions(level);
            prop_assert!(items.len() >= base.len());
            prop_assert_eq!(&items[..base.len()], base);
        }

        #[test]
        fn prop_report_reflects_tier(p in 1i32..=5, i in 1i32..=5) {
            let level = scoring::severity(p, i);
            let report = detailed_report(level, p, i);
            let tier_line = format!("NIVEL DE RIESGO: {}", level);
            let horizon_line = format!("Programar seguimiento en {}", level.follow_up_horizon());
            prop_assert!(report.contains(&tier_line));
            prop_assert!(report.contains(&horizon_line));
        }
    }
}
