use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{NormalizedBatch, ZapAlertRecord};

#[derive(Debug, Default, Deserialize)]
struct Report {
    #[serde(default)]
    site: Vec<Site>,
}

#[derive(Debug, Default, Deserialize)]
struct Site {
    #[serde(default)]
    alerts: Vec<Alert>,
}

#[derive(Debug, Default, Deserialize)]
struct Alert {
    alert: Option<String>,
    confidence: Option<String>,
    solution: Option<String>,
    desc: Option<String>,
    riskcode: Option<String>,
    reference: Option<String>,
}

/// ZAP baseline report: one row per alert across all scanned sites. The
/// free-text fields arrive wrapped in HTML paragraph tags, which are
/// stripped before persisting.
pub fn normalize(payload: &Value) -> NormalizedBatch {
    let report: Report = serde_json::from_value(payload.clone()).unwrap_or_default();

    let mut batch = NormalizedBatch::default();
    batch.lists.zap_alerts = report
        .site
        .iter()
        .flat_map(|site| site.alerts.iter())
        .map(|alert| ZapAlertRecord {
            alert_name: alert
                .alert
                .clone()
                .unwrap_or_else(|| "Unknown alert".to_string()),
            confidence: alert.confidence.clone(),
            solution: alert.solution.as_deref().map(strip_paragraph_tags),
            description: alert.desc.as_deref().map(strip_paragraph_tags),
            risk_code: alert.riskcode.clone(),
            reference: alert.reference.as_deref().map(strip_paragraph_tags),
        })
        .collect();
    batch
}

fn strip_paragraph_tags(text: &str) -> String {
    text.replace("<p>", "").replace("</p>", "")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_alerts_across_sites_and_strips_paragraph_tags() {
        let payload = json!({
            "site": [
                {
                    "alerts": [{
                        "alert": "X-Content-Type-Options Header Missing",
                        "confidence": "2",
                        "riskcode": "1",
                        "desc": "<p>The Anti-MIME-Sniffing header was not set.</p>",
                        "solution": "<p>Set the header to nosniff.</p>",
                        "reference": "<p>https://owasp.org</p>"
                    }]
                },
                { "alerts": [{ "alert": "Cookie Without Secure Flag" }] }
            ]
        });

        let batch = normalize(&payload);
        let alerts = &batch.lists.zap_alerts;

        assert_eq!(alerts.len(), 2);
        assert_eq!(
            alerts[0].description.as_deref(),
            Some("The Anti-MIME-Sniffing header was not set.")
        );
        assert_eq!(alerts[0].solution.as_deref(), Some("Set the header to nosniff."));
        assert_eq!(alerts[0].reference.as_deref(), Some("https://owasp.org"));
        assert_eq!(alerts[1].alert_name, "Cookie Without Secure Flag");
    }

    #[test]
    fn empty_report_produces_no_rows() {
        assert!(normalize(&json!({})).lists.zap_alerts.is_empty());
    }
}
