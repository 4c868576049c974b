//! Share-token resolution for the public survey path.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::survey::{Availability, Survey};
use crate::services::store::{StoreError, SurveyStore};

/// Why a found survey is not taking responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    Expired,
    CapacityReached,
}

impl ClosedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosedReason::Expired => "expired",
            ClosedReason::CapacityReached => "capacity_reached",
        }
    }

    /// Message shown to a respondent.
    pub fn message(&self) -> &'static str {
        match self {
            ClosedReason::Expired => "This survey has expired",
            ClosedReason::CapacityReached => {
                "This survey has reached its maximum number of responses"
            }
        }
    }
}

/// Outcome of resolving a share token to a published survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    /// The survey is accepting responses.
    Open(Survey),
    /// The survey exists but no longer accepts responses.
    Closed { survey: Survey, reason: ClosedReason },
}

impl ShareLink {
    pub fn survey(&self) -> &Survey {
        match self {
            ShareLink::Open(survey) => survey,
            ShareLink::Closed { survey, .. } => survey,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ShareLink::Open(_))
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Survey not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Classifies the result of a token lookup.
///
/// A missing or unpublished survey is `NotFound`, never a closed link. Expiry
/// and capacity are checked in the same order as response validation.
pub fn classify_share_lookup(
    found: Option<Survey>,
    now: DateTime<Utc>,
    response_count: i64,
) -> Result<ShareLink, ResolveError> {
    let survey = found.ok_or(ResolveError::NotFound)?;

    match survey.availability(now, response_count) {
        Availability::NotPublished => Err(ResolveError::NotFound),
        Availability::Expired => Ok(ShareLink::Closed {
            survey,
            reason: ClosedReason::Expired,
        }),
        Availability::CapacityReached => Ok(ShareLink::Closed {
            survey,
            reason: ClosedReason::CapacityReached,
        }),
        Availability::Open => Ok(ShareLink::Open(survey)),
    }
}

/// Looks up a share token and classifies the survey behind it.
///
/// Malformed tokens are reported as not found without touching the store, and
/// responses are only counted for surveys with a capacity limit.
pub async fn resolve_share_token(
    store: &dyn SurveyStore,
    token: &str,
    now: DateTime<Utc>,
) -> Result<ShareLink, ResolveError> {
    if !shared::crypto::is_well_formed_share_token(token) {
        return Err(ResolveError::NotFound);
    }

    let found = store.get_survey_by_token(token).await?;
    let response_count = match &found {
        Some(survey) if survey.settings.max_responses.is_some() => {
            store.count_responses(survey.id).await?
        }
        _ => 0,
    };

    classify_share_lookup(found, now, response_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::{Answers, NewSurveyResponse};
    use crate::models::survey::tests::{fixed_now, make_survey};
    use crate::services::store::InMemorySurveyStore;
    use chrono::Duration;

    #[test]
    fn test_classify_missing() {
        assert!(matches!(
            classify_share_lookup(None, fixed_now(), 0),
            Err(ResolveError::NotFound)
        ));
    }

    #[test]
    fn test_classify_unpublished_is_not_found() {
        let mut survey = make_survey(vec![]);
        survey.is_published = false;
        survey.settings.expires_at = Some(fixed_now() - Duration::days(1));

        assert!(matches!(
            classify_share_lookup(Some(survey), fixed_now(), 0),
            Err(ResolveError::NotFound)
        ));
    }

    #[test]
    fn test_classify_closed_reasons() {
        let mut survey = make_survey(vec![]);
        survey.settings.expires_at = Some(fixed_now() - Duration::minutes(1));
        survey.settings.max_responses = Some(1);

        match classify_share_lookup(Some(survey.clone()), fixed_now(), 1).unwrap() {
            ShareLink::Closed { reason, .. } => assert_eq!(reason, ClosedReason::Expired),
            other => panic!("unexpected link: {:?}", other),
        }

        survey.settings.expires_at = None;
        match classify_share_lookup(Some(survey), fixed_now(), 1).unwrap() {
            ShareLink::Closed { reason, .. } => {
                assert_eq!(reason, ClosedReason::CapacityReached)
            }
            other => panic!("unexpected link: {:?}", other),
        }
    }

    #[test]
    fn test_classify_open() {
        let survey = make_survey(vec![]);
        let link = classify_share_lookup(Some(survey.clone()), fixed_now(), 0).unwrap();
        assert!(link.is_open());
        assert_eq!(link.survey(), &survey);
    }

    #[tokio::test]
    async fn test_resolve_unpublished_token_is_not_found() {
        let store = InMemorySurveyStore::new();
        let mut survey = make_survey(vec![]);
        survey.is_published = false;
        let token = survey.share_token.clone().unwrap();
        store.seed_survey(survey).await;

        let result = resolve_share_token(&store, &token, fixed_now()).await;
        assert!(matches!(result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn test_resolve_malformed_token() {
        let store = InMemorySurveyStore::failing();
        let result = resolve_share_token(&store, "../etc", fixed_now()).await;
        assert!(matches!(result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn test_resolve_at_capacity() {
        let store = InMemorySurveyStore::new();
        let mut survey = make_survey(vec![]);
        survey.settings.max_responses = Some(1);
        let (id, token) = (survey.id, survey.share_token.clone().unwrap());
        store.seed_survey(survey).await;
        store
            .insert_response(NewSurveyResponse {
                survey_id: id,
                answers: Answers::new(),
                respondent_email: None,
                ip_address: None,
                user_agent: None,
                submitted_at: fixed_now(),
            })
            .await
            .unwrap();

        match resolve_share_token(&store, &token, fixed_now()).await.unwrap() {
            ShareLink::Closed { reason, .. } => {
                assert_eq!(reason, ClosedReason::CapacityReached)
            }
            other => panic!("unexpected link: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_store_failure() {
        let store = InMemorySurveyStore::failing();
        let token = make_survey(vec![]).share_token.unwrap();
        let result = resolve_share_token(&store, &token, fixed_now()).await;
        assert!(matches!(result, Err(ResolveError::Store(StoreError::Backend(_)))));
    }
}
