use crate::auth::Principal;
use crate::database::models::Listing;

/// Result of binding a mutation request to the authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
}

/// A listing may only be mutated by the principal that owns it.
///
/// Callers check this before touching the photo store or the repository, so
/// a `Forbidden` outcome leaves no partial side effects behind.
pub fn authorize(principal: &Principal, listing: &Listing) -> Access {
    if listing.owner_id == principal.user_id {
        Access::Allowed
    } else {
        Access::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn principal(user_id: Uuid) -> Principal {
        Principal {
            user_id,
            full_name: "Dev Mehta".to_string(),
            email: "dev@example.com".to_string(),
            username: "dev".to_string(),
        }
    }

    fn listing(owner_id: Uuid) -> Listing {
        Listing {
            property_id: Uuid::new_v4(),
            owner_id,
            title: "Sea View".to_string(),
            description: None,
            price: None,
            city: None,
            photos: vec!["/uploads/prop_a.jpg".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_is_allowed() {
        let owner = Uuid::new_v4();
        assert_eq!(authorize(&principal(owner), &listing(owner)), Access::Allowed);
    }

    #[test]
    fn non_owner_is_forbidden() {
        assert_eq!(
            authorize(&principal(Uuid::new_v4()), &listing(Uuid::new_v4())),
            Access::Forbidden
        );
    }
}
