use funnelscope_core::dataset::csv_field;
use funnelscope_insights::ActionItem;

const HEADER: &str = "Priority,Category,Issue,Current Rate,Recommendation,Expected Impact";

/// The action plan as a CSV sheet, one row per item
pub fn render_recommendations(plan: &[ActionItem]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for item in plan {
        let fields = [
            csv_field(&item.priority),
            csv_field(&item.category),
            csv_field(&item.issue),
            csv_field(&item.current_rate),
            csv_field(&item.recommendation),
            item.expected_impact.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnelscope_insights::Impact;

    #[test]
    fn test_quotes_fields_with_commas() {
        let plan = vec![ActionItem {
            priority: "P1".to_string(),
            category: "Mobile Optimization".to_string(),
            issue: "Mobile conversion gap".to_string(),
            current_rate: "9.80% mobile CR".to_string(),
            recommendation: "Optimize mobile checkout flow, implement one-click payment options"
                .to_string(),
            expected_impact: Impact::Medium,
        }];

        let csv = render_recommendations(&plan);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            "P1,Mobile Optimization,Mobile conversion gap,9.80% mobile CR,\"Optimize mobile checkout flow, implement one-click payment options\",Medium"
        );
    }

    #[test]
    fn test_empty_plan_is_header_only() {
        assert_eq!(render_recommendations(&[]), format!("{}\n", HEADER));
    }
}
