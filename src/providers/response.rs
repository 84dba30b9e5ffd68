//! XML documents returned by the usage service
//!
//! ```xml
//! <internode><api><services count="1">
//!   <service type="Personal_ADSL" href="/api/v1.5/1234567">1234567</service>
//! </services></api></internode>
//!
//! <internode><api>
//!   <service type="Personal_ADSL" request="usage">1234567</service>
//!   <traffic name="total" rollover="2012-08-16" plan-interval="Monthly"
//!            quota="10000000000" unit="bytes">4650528270</traffic>
//! </api></internode>
//! ```

use chrono::NaiveDate;
use roxmltree::{Document, Node};

use crate::usage::{UsageRecord, BYTES_UNIT, MONTHLY_INTERVAL};

const ROLLOVER_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("No <{path}> element in usage response")]
    MissingElement { path: String },
    #[error("Invalid usage record ({reason}): {partial:?}")]
    Invalid {
        reason: String,
        partial: PartialUsage,
    },
}

/// Whatever was read from a usage element before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialUsage {
    pub service_id: Option<String>,
    pub quota_bytes: Option<u64>,
    pub used_bytes: Option<u64>,
    pub rollover_date: Option<NaiveDate>,
    pub plan_interval: Option<String>,
    pub unit: Option<String>,
}

impl PartialUsage {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.service_id.is_none() {
            missing.push("service_id");
        }
        if self.quota_bytes.is_none() {
            missing.push("quota");
        }
        if self.used_bytes.is_none() {
            missing.push("used");
        }
        if self.rollover_date.is_none() {
            missing.push("rollover");
        }
        if self.plan_interval.is_none() {
            missing.push("plan-interval");
        }
        if self.unit.is_none() {
            missing.push("unit");
        }
        missing
    }

    fn invalid(&self, reason: String) -> ParseError {
        ParseError::Invalid {
            reason,
            partial: self.clone(),
        }
    }

    fn finish(self) -> Result<UsageRecord, ParseError> {
        match (
            &self.service_id,
            self.quota_bytes,
            self.used_bytes,
            self.rollover_date,
            &self.plan_interval,
            &self.unit,
        ) {
            (Some(service_id), Some(quota), Some(used), Some(rollover), Some(interval), Some(unit)) => {
                if interval != MONTHLY_INTERVAL {
                    return Err(self.invalid(format!("unsupported plan interval {interval:?}")));
                }
                if unit != BYTES_UNIT {
                    return Err(self.invalid(format!("unsupported unit {unit:?}")));
                }
                Ok(UsageRecord {
                    service_id: service_id.clone(),
                    quota_bytes: quota,
                    used_bytes: used,
                    rollover_date: rollover,
                    plan_interval: interval.clone(),
                    unit: unit.clone(),
                })
            }
            _ => Err(self.invalid(format!("missing {}", self.missing_fields().join(", ")))),
        }
    }
}

/// Elements matching `path`, walked from the root element, in document order
fn select<'a, 'input>(doc: &'a Document<'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let mut current = vec![doc.root_element()];
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current = current
            .into_iter()
            .flat_map(|node| node.children().filter(move |c| c.has_tag_name(segment)))
            .collect();
    }
    current
}

pub fn parse_services(xml: &str, service_path: &str) -> Result<Vec<String>, ParseError> {
    let doc = Document::parse(xml)?;
    Ok(select(&doc, service_path)
        .into_iter()
        .filter_map(|node| node.text())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn parse_usage(xml: &str, usage_path: &str, service_id: &str) -> Result<UsageRecord, ParseError> {
    let doc = Document::parse(xml)?;
    let node = select(&doc, usage_path)
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::MissingElement {
            path: usage_path.to_string(),
        })?;

    let mut partial = PartialUsage {
        service_id: Some(service_id.to_string()).filter(|id| !id.is_empty()),
        plan_interval: node.attribute("plan-interval").map(str::to_string),
        unit: node.attribute("unit").map(str::to_string),
        ..Default::default()
    };

    partial.used_bytes = parse_count(node.text(), "used", &partial)?;
    partial.quota_bytes = parse_count(node.attribute("quota"), "quota", &partial)?;
    partial.rollover_date = match node.attribute("rollover").map(str::trim) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, ROLLOVER_FORMAT)
                .map_err(|_| partial.invalid(format!("rollover {raw:?} is not a date")))?,
        ),
        None => None,
    };

    partial.finish()
}

fn parse_count(raw: Option<&str>, field: &str, partial: &PartialUsage) -> Result<Option<u64>, ParseError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| partial.invalid(format!("{field} {raw:?} is not a byte count"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<internode>
  <api>
    <services count="2">
      <service type="Personal_ADSL" href="/api/v1.5/1234567">1234567</service>
      <service type="Personal_NBN" href="/api/v1.5/7654321">7654321</service>
    </services>
  </api>
</internode>"#;

    fn usage_doc(attrs: &str, used: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<internode>
  <api>
    <service type="Personal_ADSL" request="usage">1234567</service>
    <traffic name="total" {attrs}>{used}</traffic>
  </api>
</internode>"#
        )
    }

    const GOOD_ATTRS: &str =
        r#"rollover="2012-08-16" plan-interval="Monthly" quota="10000000000" unit="bytes""#;

    #[test]
    fn test_services_in_document_order() {
        let services = parse_services(SERVICES, "api/services/service").unwrap();
        assert_eq!(services, vec!["1234567", "7654321"]);
    }

    #[test]
    fn test_no_services_is_empty_not_error() {
        let xml = r#"<internode><api><services count="0"></services></api></internode>"#;
        assert!(parse_services(xml, "api/services/service").unwrap().is_empty());
    }

    #[test]
    fn test_services_wrong_path_is_empty() {
        assert!(parse_services(SERVICES, "api/service").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(matches!(
            parse_services("<internode><api>", "api/services/service"),
            Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn test_usage_record_fields() {
        let record = parse_usage(&usage_doc(GOOD_ATTRS, "4650528270"), "api/traffic", "1234567").unwrap();

        assert_eq!(record.service_id, "1234567");
        assert_eq!(record.quota_bytes, 10_000_000_000);
        assert_eq!(record.used_bytes, 4_650_528_270);
        assert_eq!(record.rollover_date, NaiveDate::from_ymd_opt(2012, 8, 16).unwrap());
        assert_eq!(record.plan_interval, "Monthly");
        assert_eq!(record.unit, "bytes");
    }

    #[test]
    fn test_missing_quota_is_rejected() {
        let attrs = r#"rollover="2012-08-16" plan-interval="Monthly" unit="bytes""#;
        let err = parse_usage(&usage_doc(attrs, "4650528270"), "api/traffic", "1234567").unwrap_err();

        match err {
            ParseError::Invalid { reason, partial } => {
                assert!(reason.contains("quota"), "{reason}");
                assert_eq!(partial.quota_bytes, None);
                assert_eq!(partial.used_bytes, Some(4_650_528_270));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_yearly_plan_is_rejected() {
        let attrs = r#"rollover="2012-08-16" plan-interval="Yearly" quota="10000000000" unit="bytes""#;
        let err = parse_usage(&usage_doc(attrs, "1"), "api/traffic", "1234567").unwrap_err();

        assert!(matches!(err, ParseError::Invalid { ref reason, .. } if reason.contains("Yearly")));
    }

    #[test]
    fn test_non_byte_unit_is_rejected() {
        let attrs = r#"rollover="2012-08-16" plan-interval="Monthly" quota="10" unit="GB""#;
        let err = parse_usage(&usage_doc(attrs, "1"), "api/traffic", "1234567").unwrap_err();

        assert!(matches!(err, ParseError::Invalid { ref reason, .. } if reason.contains("GB")));
    }

    #[test]
    fn test_missing_used_text_is_rejected() {
        let err = parse_usage(&usage_doc(GOOD_ATTRS, ""), "api/traffic", "1234567").unwrap_err();
        assert!(matches!(err, ParseError::Invalid { ref reason, .. } if reason.contains("used")));
    }

    #[test]
    fn test_bad_numbers_and_dates_are_rejected() {
        let bad_quota = r#"rollover="2012-08-16" plan-interval="Monthly" quota="lots" unit="bytes""#;
        assert!(parse_usage(&usage_doc(bad_quota, "1"), "api/traffic", "1").is_err());

        let bad_date = r#"rollover="16/08/2012" plan-interval="Monthly" quota="10" unit="bytes""#;
        assert!(parse_usage(&usage_doc(bad_date, "1"), "api/traffic", "1").is_err());

        assert!(parse_usage(&usage_doc(GOOD_ATTRS, "-5"), "api/traffic", "1").is_err());
    }

    #[test]
    fn test_missing_traffic_element() {
        let xml = r#"<internode><api><service>1234567</service></api></internode>"#;
        assert!(matches!(
            parse_usage(xml, "api/traffic", "1234567"),
            Err(ParseError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_error_message_dumps_partial_record() {
        let attrs = r#"plan-interval="Monthly" quota="10000000000" unit="bytes""#;
        let err = parse_usage(&usage_doc(attrs, "42"), "api/traffic", "1234567").unwrap_err();
        let message = err.to_string();

        assert!(message.contains("rollover"), "{message}");
        assert!(message.contains("used_bytes: Some(42)"), "{message}");
    }
}
