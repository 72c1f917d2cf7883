use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Uuid);

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[inline]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

id_type!(SubscriptionId);
id_type!(OwnerId);

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! id_unique_test {
        ($name:ident, $test_name:ident) => {
            #[test]
            fn $test_name() {
                let result = $name::new();
                assert_ne!(result, $name::new())
            }
        };
    }

    id_unique_test!(
        SubscriptionId,
        given_new_subscription_id_when_generated_should_be_unique
    );
    id_unique_test!(OwnerId, given_new_owner_id_when_generated_should_be_unique);

    #[test]
    fn given_uuid_string_when_parsed_should_round_trip_display() {
        let id = OwnerId::new();
        let parsed: OwnerId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn given_garbage_when_parsed_should_fail() {
        assert!("not-a-uuid".parse::<SubscriptionId>().is_err());
    }
}
