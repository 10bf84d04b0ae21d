//! Explicit attribute-based authorization: a policy function evaluated by
//! handlers before any service call, independent of routing machinery.

use crate::auth::AuthUser;
use crate::entities::appointment;
use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

pub enum Resource<'a> {
    /// The appointment collection as a whole: listing and deleting entries.
    Appointments,
    /// A specific appointment; readable and updatable by its owning client.
    Appointment(&'a appointment::Model),
    /// Admin-managed records: users, inventory, receipts, financial logs,
    /// catalog and availability mutations.
    Admin,
}

/// Central access decision. Owners are matched by authenticated email
/// against the appointment's client email.
pub fn can_access(actor: Option<&AuthUser>, resource: &Resource<'_>, action: Action) -> bool {
    let admin = actor.map(|a| a.is_admin).unwrap_or(false);

    match resource {
        Resource::Appointments | Resource::Admin => admin,
        Resource::Appointment(appointment) => match action {
            Action::Create => true,
            Action::Read | Action::Update => {
                admin
                    || actor
                        .map(|a| a.owns_email(&appointment.client_email))
                        .unwrap_or(false)
            }
            Action::Delete => admin,
        },
    }
}

/// `can_access` lifted into the error taxonomy: denial is a 403.
pub fn require(
    actor: Option<&AuthUser>,
    resource: &Resource<'_>,
    action: Action,
) -> Result<(), ServiceError> {
    if can_access(actor, resource, action) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "insufficient permissions for this resource".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn actor(email: &str, is_admin: bool) -> AuthUser {
        AuthUser {
            user_id: 1,
            name: "Actor".to_string(),
            email: email.to_string(),
            is_admin,
            token_id: "jti".to_string(),
        }
    }

    fn appointment_for(client_email: &str) -> appointment::Model {
        appointment::Model {
            appointment_id: 1,
            service_id: 1,
            slot_id: 1,
            client_name: "Client".to_string(),
            client_email: client_email.to_string(),
            client_address: "123 Peach St".to_string(),
            appointment_date_time: Utc::now(),
            status: "PENDING".to_string(),
            travel_fee: None,
            total_price: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn listing_appointments_is_admin_only() {
        let admin = actor("admin@example.com", true);
        let user = actor("user@example.com", false);

        assert!(can_access(
            Some(&admin),
            &Resource::Appointments,
            Action::Read
        ));
        assert!(!can_access(
            Some(&user),
            &Resource::Appointments,
            Action::Read
        ));
        assert!(!can_access(None, &Resource::Appointments, Action::Read));
    }

    #[test]
    fn owner_may_read_and_update_their_appointment() {
        let owner = actor("client@example.com", false);
        let other = actor("other@example.com", false);
        let appt = appointment_for("client@example.com");

        for action in [Action::Read, Action::Update] {
            assert!(can_access(Some(&owner), &Resource::Appointment(&appt), action));
            assert!(!can_access(Some(&other), &Resource::Appointment(&appt), action));
            assert!(!can_access(None, &Resource::Appointment(&appt), action));
        }
    }

    #[test]
    fn only_admin_may_delete() {
        let owner = actor("client@example.com", false);
        let admin = actor("admin@example.com", true);
        let appt = appointment_for("client@example.com");

        assert!(!can_access(
            Some(&owner),
            &Resource::Appointment(&appt),
            Action::Delete
        ));
        assert!(can_access(
            Some(&admin),
            &Resource::Appointment(&appt),
            Action::Delete
        ));
    }

    #[test]
    fn admin_area_is_closed_to_everyone_else() {
        let user = actor("user@example.com", false);
        assert!(!can_access(Some(&user), &Resource::Admin, Action::Read));
        assert!(!can_access(None, &Resource::Admin, Action::Update));
        assert!(require(Some(&user), &Resource::Admin, Action::Read).is_err());
    }
}
