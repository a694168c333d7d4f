use guestbook::GuestBook;
use guestbook::k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use crate::store::GuestBookStore;

use super::status::{Outcome, desired_status};
use super::{GuestBookError, GuestBookReconciler};

impl GuestBookReconciler {
    pub(crate) async fn apply_status<S>(
        &self,
        store: &S,
        guestbook: &GuestBook,
        outcome: Outcome<'_>,
    ) -> Result<(), GuestBookError>
    where
        S: GuestBookStore + ?Sized,
    {
        let status = desired_status(guestbook, &outcome, &Time(chrono::Utc::now()));
        if guestbook.status.as_ref() == Some(&status) {
            tracing::debug!("Status is up to date");
            return Ok(());
        }
        let mut guestbook = guestbook.clone();
        guestbook.status = Some(status);
        store.patch_guestbook_status(&guestbook).await?;
        Ok(())
    }
}
