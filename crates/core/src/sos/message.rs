//! Alert message templates.

use super::{Requester, SosFlow};
use crate::geo::GeoPoint;

/// Compose the single alert text sent to every responder of one SOS.
pub fn compose_alert(flow: SosFlow, requester: &Requester, point: &GeoPoint) -> String {
    let link = point.map_link();
    match (flow, requester) {
        (
            SosFlow::Directory,
            Requester::User {
                display_name,
                email,
                ..
            },
        ) => format!("🆘 SOS Alert!\n\nUser: {display_name}\nEmail: {email}\nLocation: {link}"),
        (
            _,
            Requester::User {
                display_name,
                email,
                ..
            },
        ) => format!(
            "🚨 Emergency! A person needs medical assistance at {link}. Please respond quickly!\n\n\
             Reported by: {display_name} ({email})"
        ),
        (_, Requester::ThirdParty { name, phone, .. }) => format!(
            "🚨 Emergency! A person needs medical assistance at {link}. Please respond quickly!\n\n\
             Patient: {name}\nContact: {phone}"
        ),
    }
}

/// Compose the text for a channel test alert.
pub fn compose_test_alert(display_name: &str, email: &str, point: &GeoPoint) -> String {
    format!(
        "🆘 Test SOS Alert!\n\nUser: {display_name}\nEmail: {email}\nLocation: {}",
        point.map_link()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> GeoPoint {
        GeoPoint::new(77.1, 28.6).unwrap()
    }

    fn user() -> Requester {
        Requester::User {
            user_id: 7,
            display_name: "Asha".into(),
            email: "asha@example.com".into(),
        }
    }

    #[test]
    fn directory_alert_names_user_and_link() {
        let msg = compose_alert(SosFlow::Directory, &user(), &point());
        assert!(msg.starts_with("🆘 SOS Alert!"));
        assert!(msg.contains("User: Asha"));
        assert!(msg.contains("Email: asha@example.com"));
        assert!(msg.contains("https://maps.google.com/?q=28.6,77.1"));
    }

    #[test]
    fn self_help_alert_credits_reporter() {
        let msg = compose_alert(SosFlow::SelfHelp, &user(), &point());
        assert!(msg.contains("needs medical assistance at https://maps.google.com/?q=28.6,77.1"));
        assert!(msg.contains("Reported by: Asha (asha@example.com)"));
    }

    #[test]
    fn other_help_alert_names_patient() {
        let requester = Requester::ThirdParty {
            name: "Ravi".into(),
            phone: "+919800000000".into(),
            reported_by: None,
        };
        let msg = compose_alert(SosFlow::OtherHelp, &requester, &point());
        assert!(msg.contains("Patient: Ravi"));
        assert!(msg.contains("Contact: +919800000000"));
    }

    #[test]
    fn test_alert_is_marked_as_test() {
        let msg = compose_test_alert("Asha", "asha@example.com", &point());
        assert!(msg.starts_with("🆘 Test SOS Alert!"));
        assert!(msg.contains("q=28.6,77.1"));
    }
}
