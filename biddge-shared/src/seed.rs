/// Sample community data
///
/// One routine, [`seed_communities`], used by both the `biddge-seed` operator
/// command and the `POST /api/debug/seed` hook.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::community::Community;
use crate::store::{BatchInsert, Store, StoreError};

/// Creator id stamped on seeded communities
pub const SYSTEM_CREATOR_ID: &str = "system@biddge.com";

/// Creator display name stamped on seeded communities
pub const SYSTEM_CREATOR_NAME: &str = "Biddge Team";

/// What to do when communities already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    /// Leave a non-empty store untouched
    SkipIfPresent,

    /// Delete every community, then insert the samples
    Replace,
}

/// Result of a seeding run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { inserted: usize },
    Skipped { existing: u64 },
}

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Seeding failed: {0}")]
    Store(#[from] StoreError),
}

struct Sample {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    member_count: i64,
    photo: &'static str,
}

const SAMPLES: [Sample; 8] = [
    Sample {
        name: "Career Growth",
        description: "Connect with professionals and mentors to accelerate your career journey. Share insights, get advice, and grow together.",
        category: "Career Growth",
        member_count: 2847,
        photo: "1522071820081-009f0129c71c",
    },
    Sample {
        name: "Startup Builders",
        description: "A vibrant community for founders, makers, and entrepreneurs building the next big thing. Share your journey, learn from others, and find co-founders.",
        category: "Startup Builders",
        member_count: 1823,
        photo: "1515187029135-18ee286d815b",
    },
    Sample {
        name: "AI & ML Hub",
        description: "Explore the world of artificial intelligence and machine learning. From beginners to experts, learn, share, and innovate together.",
        category: "AI & ML Hub",
        member_count: 4276,
        photo: "1677442136019-21780ecad995",
    },
    Sample {
        name: "Tech Community",
        description: "The largest tech community on Biddge. Discuss latest technologies, share projects, and stay updated with industry trends.",
        category: "Tech Community",
        member_count: 8542,
        photo: "1522071820081-009f0129c71c",
    },
    Sample {
        name: "Fitness & Health",
        description: "Transform your body and mind. Share workout routines, nutrition tips, and wellness advice with a supportive community.",
        category: "Fitness & Health",
        member_count: 3641,
        photo: "1571019614242-c5c5dee9f50b",
    },
    Sample {
        name: "Design Circle",
        description: "A creative space for designers to share work, get feedback, and learn new design techniques. All design disciplines welcome.",
        category: "Design Circle",
        member_count: 2156,
        photo: "1561070791-2526d30994b5",
    },
    Sample {
        name: "Digital Marketing",
        description: "Master the art of digital marketing. Learn SEO, social media, content strategy, and analytics from industry experts.",
        category: "Marketing",
        member_count: 1892,
        photo: "1557838923-2985c318be48",
    },
    Sample {
        name: "Personal Finance",
        description: "Take control of your financial future. Learn about investing, budgeting, and wealth building with our community of finance enthusiasts.",
        category: "Finance",
        member_count: 3245,
        photo: "1579621970588-a35d0e7ab9b6",
    },
];

/// The eight sample communities, each with a fresh id and timestamp
pub fn sample_communities() -> Vec<Community> {
    let now = Utc::now();

    SAMPLES
        .iter()
        .map(|sample| Community {
            id: Uuid::new_v4().to_string(),
            name: sample.name.to_string(),
            description: sample.description.to_string(),
            category: sample.category.to_string(),
            creator_id: SYSTEM_CREATOR_ID.to_string(),
            creator_name: SYSTEM_CREATOR_NAME.to_string(),
            member_count: sample.member_count,
            image_url: Some(format!(
                "https://images.unsplash.com/photo-{}?w=800&auto=format&fit=crop",
                sample.photo
            )),
            created_at: now,
        })
        .collect()
}

/// Populates the community collection with the sample data
///
/// Each mode is a single store call, so overlapping runs never stack
/// duplicate samples: of two concurrent `SkipIfPresent` runs on an empty
/// store, one seeds and the other skips.
///
/// # Errors
///
/// `SeedError::Store` if the store call fails. Nothing is written in that case.
pub async fn seed_communities<S>(store: &S, mode: SeedMode) -> Result<SeedOutcome, SeedError>
where
    S: Store + ?Sized,
{
    let samples = sample_communities();
    let inserted = samples.len();

    match mode {
        SeedMode::SkipIfPresent => match store.insert_communities_if_empty(samples).await? {
            BatchInsert::Inserted(inserted) => {
                info!(inserted, "Seeded sample communities");
                Ok(SeedOutcome::Seeded { inserted })
            }
            BatchInsert::NotEmpty(existing) => {
                info!(existing, "Communities already present, skipping seed");
                Ok(SeedOutcome::Skipped { existing })
            }
        },
        SeedMode::Replace => {
            let deleted = store.replace_communities(samples).await?;
            info!(deleted, inserted, "Replaced communities with samples");
            Ok(SeedOutcome::Seeded { inserted })
        }
    }
}
