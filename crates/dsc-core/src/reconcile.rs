//! Status reconciliation.
//!
//! Given the configuration names an agent registered and the checksum claims
//! it sends with `GetDscAction`, decide per configuration and for the whole
//! node whether the agent must download its configuration again.
//!
//! The shape of the claims selects the branch:
//!
//! | Claims | Outcome |
//! |---|---|
//! | none | no details, node `OK` |
//! | one, empty checksum | `GetConfiguration` for every registered name and for the node |
//! | one, with checksum | compare against the single registered configuration |
//! | several, first named | compare each named claim, skipping malformed names and names that fail to resolve |
//! | several, first unnamed | [`DscError::UnnamedClaims`] |
//!
//! The node verdict is `OK` exactly when every detail is `OK`.

use crate::collaborator::{configuration_hash, ConfigurationRepository};
use crate::error::{DscError, DscResult};
use crate::request::{is_configuration_name, GetConfigurationRequest};
use crate::wire::{ActionDetail, ClientStatusItem, GetDscActionResponseBody, Verdict};
use std::future::Future;

/// Runs the reconciliation decision.
///
/// `lookup` resolves a configuration name to the checksum the server holds
/// for it.
pub async fn reconcile<F, Fut>(
    registered: &[String],
    claims: &[ClientStatusItem],
    mut lookup: F,
) -> DscResult<GetDscActionResponseBody>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = DscResult<String>>,
{
    match claims {
        [] => Ok(GetDscActionResponseBody {
            details: Vec::new(),
            node_status: Verdict::Ok,
        }),

        // First contact: nothing has been applied yet.
        [claim] if claim.checksum.is_empty() => Ok(GetDscActionResponseBody {
            details: registered
                .iter()
                .map(|name| ActionDetail::new(name.as_str(), Verdict::GetConfiguration))
                .collect(),
            node_status: Verdict::GetConfiguration,
        }),

        [claim] => {
            let [name] = registered else {
                return Err(DscError::RegistrationMismatch {
                    registered: registered.len(),
                });
            };
            let expected = lookup(name.clone()).await?;
            let verdict = compare(&expected, &claim.checksum);
            Ok(GetDscActionResponseBody {
                details: vec![ActionDetail::new(name.as_str(), verdict)],
                node_status: verdict,
            })
        }

        [first, ..] if !first.configuration_name.is_empty() => {
            let mut details = Vec::with_capacity(claims.len());
            let mut mismatches = 0usize;

            for claim in claims {
                if !is_configuration_name(&claim.configuration_name) {
                    tracing::debug!(
                        configuration_name = %claim.configuration_name,
                        "skipping malformed partial configuration name"
                    );
                    continue;
                }
                let expected = match lookup(claim.configuration_name.clone()).await {
                    Ok(expected) => expected,
                    Err(error) => {
                        tracing::debug!(
                            configuration_name = %claim.configuration_name,
                            error = %error,
                            "skipping partial configuration that failed to resolve"
                        );
                        continue;
                    }
                };

                let verdict = compare(&expected, &claim.checksum);
                if verdict != Verdict::Ok {
                    mismatches += 1;
                }
                details.push(ActionDetail::new(
                    claim.configuration_name.as_str(),
                    verdict,
                ));
            }

            Ok(GetDscActionResponseBody {
                details,
                node_status: if mismatches > 0 {
                    Verdict::GetConfiguration
                } else {
                    Verdict::Ok
                },
            })
        }

        _ => Err(DscError::UnnamedClaims {
            claims: claims.len(),
        }),
    }
}

/// Runs [`reconcile`] with checksums resolved through `repository`.
pub async fn reconcile_with_repository(
    repository: &dyn ConfigurationRepository,
    agent_id: &str,
    registered: &[String],
    claims: &[ClientStatusItem],
) -> DscResult<GetDscActionResponseBody> {
    reconcile(registered, claims, |name| async move {
        if !is_configuration_name(&name) {
            return Err(DscError::validation(format!(
                "invalid configuration name: {name}"
            )));
        }
        configuration_hash(repository, &GetConfigurationRequest::new(agent_id, name)).await
    })
    .await
}

fn compare(expected: &str, claimed: &str) -> Verdict {
    if expected == claimed {
        Verdict::Ok
    } else {
        Verdict::GetConfiguration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    async fn run(
        registered: &[&str],
        claims: &[ClientStatusItem],
        store: &[(&str, &str)],
    ) -> DscResult<GetDscActionResponseBody> {
        let store: HashMap<String, String> = store
            .iter()
            .map(|(name, hash)| (name.to_string(), hash.to_string()))
            .collect();
        reconcile(&names(registered), claims, |name| {
            let found = store.get(&name).cloned();
            async move { found.ok_or_else(|| DscError::configuration_not_found("agent", name)) }
        })
        .await
    }

    #[tokio::test]
    async fn test_no_claims_is_ok() {
        let response = run(&["A", "B"], &[], &[]).await.unwrap();
        assert!(response.details.is_empty());
        assert_eq!(response.node_status, Verdict::Ok);
    }

    #[tokio::test]
    async fn test_first_contact_requests_every_configuration() {
        let claims = [ClientStatusItem::new("", "")];
        let response = run(&["A", "B"], &claims, &[]).await.unwrap();
        assert_eq!(
            response.details,
            vec![
                ActionDetail::new("A", Verdict::GetConfiguration),
                ActionDetail::new("B", Verdict::GetConfiguration),
            ]
        );
        assert_eq!(response.node_status, Verdict::GetConfiguration);
    }

    #[tokio::test]
    async fn test_first_contact_without_registrations() {
        let claims = [ClientStatusItem::new("", "")];
        let response = run(&[], &claims, &[]).await.unwrap();
        assert!(response.details.is_empty());
        assert_eq!(response.node_status, Verdict::GetConfiguration);
    }

    #[tokio::test]
    async fn test_single_claim_matching() {
        let claims = [ClientStatusItem::new("H1", "")];
        let response = run(&["Foo"], &claims, &[("Foo", "H1")]).await.unwrap();
        assert_eq!(response.details, vec![ActionDetail::new("Foo", Verdict::Ok)]);
        assert_eq!(response.node_status, Verdict::Ok);
    }

    #[tokio::test]
    async fn test_single_claim_mismatch() {
        let claims = [ClientStatusItem::new("OLD", "")];
        let response = run(&["Foo"], &claims, &[("Foo", "H1")]).await.unwrap();
        assert_eq!(
            response.details,
            vec![ActionDetail::new("Foo", Verdict::GetConfiguration)]
        );
        assert_eq!(response.node_status, Verdict::GetConfiguration);
    }

    #[tokio::test]
    async fn test_single_claim_with_two_registrations_fails() {
        let claims = [ClientStatusItem::new("H1", "")];
        let err = run(&["Foo", "Bar"], &claims, &[("Foo", "H1")])
            .await
            .unwrap_err();
        assert!(matches!(err, DscError::RegistrationMismatch { registered: 2 }));
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_single_claim_lookup_failure_propagates() {
        let claims = [ClientStatusItem::new("H1", "")];
        let err = run(&["Foo"], &claims, &[]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_partial_configurations() {
        let claims = [ClientStatusItem::new("X", "A"), ClientStatusItem::new("Y", "B")];
        let response = run(&["A", "B"], &claims, &[("A", "X"), ("B", "Z")])
            .await
            .unwrap();
        assert_eq!(
            response.details,
            vec![
                ActionDetail::new("A", Verdict::Ok),
                ActionDetail::new("B", Verdict::GetConfiguration),
            ]
        );
        assert_eq!(response.node_status, Verdict::GetConfiguration);
    }

    #[tokio::test]
    async fn test_partial_configurations_all_match() {
        let claims = [ClientStatusItem::new("X", "A"), ClientStatusItem::new("Y", "B")];
        let response = run(&["A", "B"], &claims, &[("A", "X"), ("B", "Y")])
            .await
            .unwrap();
        assert_eq!(response.details.len(), 2);
        assert_eq!(response.node_status, Verdict::Ok);
    }

    #[tokio::test]
    async fn test_partial_configuration_lookup_failure_is_skipped() {
        let claims = [
            ClientStatusItem::new("X", "A"),
            ClientStatusItem::new("Y", "Missing"),
        ];
        let response = run(&["A"], &claims, &[("A", "X")]).await.unwrap();
        assert_eq!(response.details, vec![ActionDetail::new("A", Verdict::Ok)]);
        assert_eq!(response.node_status, Verdict::Ok);
    }

    #[tokio::test]
    async fn test_partial_configuration_malformed_name_is_skipped() {
        let claims = [
            ClientStatusItem::new("X", "A"),
            ClientStatusItem::new("Y", "../../secret"),
        ];
        let mut looked_up = Vec::new();
        let response = reconcile(&names(&["A"]), &claims, |name| {
            looked_up.push(name);
            async { Ok("X".to_string()) }
        })
        .await
        .unwrap();
        assert_eq!(looked_up, vec!["A"]);
        assert_eq!(response.details, vec![ActionDetail::new("A", Verdict::Ok)]);
        assert_eq!(response.node_status, Verdict::Ok);
    }

    #[tokio::test]
    async fn test_multiple_unnamed_claims_fail() {
        let claims = [ClientStatusItem::new("X", ""), ClientStatusItem::new("Y", "B")];
        let err = run(&["A", "B"], &claims, &[("A", "X")]).await.unwrap_err();
        assert!(matches!(err, DscError::UnnamedClaims { claims: 2 }));
    }
}
