use chrono::Utc;
use secrecy::Secret;
use uuid::Uuid;

use crate::{
    db::Store,
    error::AppResult,
    models::{OnboardingRequest, User},
};

/// Applies a validated onboarding submission to the user's profile
///
/// Creates the user row on first sight. Fields absent from the request keep
/// their stored values; a skipped questionnaire still marks onboarding done.
pub async fn complete_onboarding(
    store: &dyn Store,
    user_id: Uuid,
    request: OnboardingRequest,
) -> AppResult<User> {
    let mut user = match store.find_user(user_id).await? {
        Some(user) => user,
        None => {
            tracing::info!(%user_id, "Creating user profile at onboarding");
            User::new(user_id)
        }
    };

    if let Some(provider) = request.provider {
        user.preferred_provider = Some(provider);
    }
    if let Some(key) = request.api_key {
        user.api_key = Some(Secret::new(key));
    }
    if let Some(photo) = request.profile_photo {
        user.profile_photo = Some(photo);
    }
    if let Some(answers) = request.onboarding {
        user.onboarding = Some(answers);
    }

    user.onboarding_completed = true;
    user.updated_at = Utc::now();

    store.save_user(&user).await?;

    tracing::info!(
        %user_id,
        skipped = user.onboarding.is_none(),
        provider = ?user.preferred_provider,
        "Onboarding completed"
    );

    Ok(user)
}
