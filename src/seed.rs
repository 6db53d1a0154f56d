use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::credential::CredentialCheck;
use crate::dto::user::NewUser;
use crate::http::{Error, Result};
use crate::logic::user::UsersHandler;

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "eager", "fancy", "gentle", "happy", "jolly", "lucky", "proud", "quiet",
    "rapid", "silly", "witty", "zesty",
];

const NOUNS: &[&str] = &[
    "badger", "comet", "falcon", "harbor", "lantern", "maple", "otter", "pebble", "river",
    "sparrow", "thistle", "walrus",
];

/// Generate a plausible user with a fresh id and a birthdate between 1900 and 2026.
pub fn random_user(rng: &mut impl Rng) -> NewUser {
    let username = format!(
        "{}_{}{}",
        ADJECTIVES.choose(rng).copied().unwrap_or("plain"),
        NOUNS.choose(rng).copied().unwrap_or("user"),
        rng.gen_range(1..1000)
    );

    let password = (0..10)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();

    NewUser {
        id: uuid::Uuid::new_v4().to_string(),
        email: format!("{username}@example.com"),
        username,
        password,
        birthdate: random_birthdate(rng),
    }
}

fn random_birthdate(rng: &mut impl Rng) -> String {
    let year = rng.gen_range(1900..=2026);
    let ordinal = rng.gen_range(1..=time::util::days_in_year(year));
    // Every ordinal up to `days_in_year` is valid for that year.
    let date = time::Date::from_ordinal_date(year, ordinal).unwrap_or(time::Date::MIN);

    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Insert `count` random users, protecting each password the same way the create route does.
pub async fn seed_users(
    handler: &impl UsersHandler,
    credentials: &dyn CredentialCheck,
    count: usize,
) -> Result<()> {
    let mut inserted = 0;

    for _ in 0..count {
        let mut user = random_user(&mut rand::thread_rng());
        user.password = credentials.protect(user.password).await?;

        match handler.insert_user(&user).await {
            Ok(()) => inserted += 1,
            // A v4 collision is not worth failing startup over.
            Err(Error::Conflict) => log::warn!("[seed_users] skipping duplicate id {}", user.id),
            Err(e) => return Err(e),
        }
    }

    log::info!("[seed_users] inserted {inserted} random users");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_users_look_plausible() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let user = random_user(&mut rng);

            assert_eq!(user.id.len(), 36);
            assert!(user.email.starts_with(&user.username));
            assert!(user.email.ends_with("@example.com"));
            assert_eq!(user.password.len(), 10);
            assert!(user.password.chars().all(|c| c.is_ascii_alphanumeric()));

            let (year, rest) = user.birthdate.split_at(4);
            let year: i32 = year.parse().unwrap();
            assert!((1900..=2026).contains(&year));
            assert_eq!(rest.len(), 6);
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = random_user(&mut rng);
        let b = random_user(&mut rng);
        assert_ne!(a.id, b.id);
    }
}
