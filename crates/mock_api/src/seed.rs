//! Deterministic fixture data.

use chrono::{TimeZone, Utc};
use upbreed_core::models::{
    Blog, BlogCategoryLink, BlogKind, Category, Course, CourseInstructor, CoursePreview,
    InstructorDetails, InstructorProfile, RevenueMonth, SubscriberMonth, Transaction, Video,
};

use crate::state::Store;

/// Login accepted by the seeded store.
pub const ADMIN_EMAIL: &str = "admin@upbreed.com";
pub const ADMIN_PASSWORD: &str = "password123";

pub const SEEDED_COURSES: usize = 20;
pub const SEEDED_INSTRUCTORS: usize = 12;

const FIRST_NAMES: [&str; 6] = ["Ross", "Monica", "Rachel", "Chandler", "Phoebe", "Joey"];
const LAST_NAMES: [&str; 2] = ["Geller", "Green"];

impl Store {
    /// A store populated with a realistic data set:
    ///
    /// * categories `1..=4`
    /// * instructors `40..=51`
    /// * courses `1..=20`, course `1` with three videos
    /// * press posts `1..=5`, news posts `6..=8`
    /// * fifteen transactions and eight months of dashboard history
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        store.users.push((ADMIN_EMAIL.to_string(), ADMIN_PASSWORD.to_string()));

        store.categories = ["Music", "Design", "Business", "Technology"]
            .iter()
            .zip(1..)
            .map(|(name, id)| Category {
                id,
                name: name.to_string(),
            })
            .collect();

        let created = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).single();
        store.instructors = (0..SEEDED_INSTRUCTORS)
            .map(|i| {
                let fname = FIRST_NAMES[i % FIRST_NAMES.len()];
                let lname = LAST_NAMES[i % LAST_NAMES.len()];
                InstructorDetails {
                    id: 40 + i as i64,
                    fname: fname.to_string(),
                    lname: lname.to_string(),
                    phone: None,
                    email: format!("{}.{}{}@upbreed.com", fname.to_lowercase(), lname.to_lowercase(), i),
                    is_active: true,
                    created_at: created,
                    updated_at: created,
                    deleted_at: None,
                    instructor_profile: InstructorProfile {
                        id: Some(400 + i as i64),
                        linked_in_url: None,
                        about: format!("{fname} teaches practical creative skills."),
                        description: None,
                        profile_picture_url: None,
                        expertise: None,
                        title: None,
                    },
                }
            })
            .collect();

        store.courses = (1..=SEEDED_COURSES as i64)
            .map(|id| {
                let teacher = &store.instructors[(id as usize - 1) % SEEDED_INSTRUCTORS];
                let category = store.categories[(id as usize - 1) % 4].clone();
                Course {
                    id,
                    title: format!("Course {id}"),
                    description: format!("Everything about topic number {id}."),
                    thumbnail: None,
                    is_active: true,
                    instructor: CourseInstructor {
                        id: Some(teacher.id),
                        fname: teacher.fname.clone(),
                        lname: teacher.lname.clone(),
                    },
                    categories: vec![category],
                    preview: Some(CoursePreview {
                        lesson_count: 10,
                        duration_in_minutes: 90,
                    }),
                    videos: Vec::new(),
                }
            })
            .collect();

        store.videos.insert(
            1,
            (1..=3)
                .map(|n| Video {
                    id: 100 + n,
                    title: format!("Lesson {n}"),
                    description: String::new(),
                    bunny_video_id: format!("bunny-{n}"),
                    is_trailer: n == 1,
                    is_public: n == 1,
                })
                .collect(),
        );

        store.blogs = (1..=8)
            .map(|id| {
                let category = store.categories[(id as usize - 1) % 4].clone();
                Blog {
                    id,
                    title: format!("Post {id}"),
                    description: format!("Summary of post {id}."),
                    preview_image: None,
                    content: format!("<p>Body of post {id}</p>"),
                    is_published: id % 2 == 1,
                    kind: if id <= 5 { BlogKind::Press } else { BlogKind::News },
                    created_at: created,
                    updated_at: created,
                    categories: vec![BlogCategoryLink {
                        id: 900 + id,
                        category,
                    }],
                }
            })
            .collect();

        store.transactions = (1..=15)
            .filter_map(|id| {
                let created_at = Utc.with_ymd_and_hms(2025, 8, id as u32, 12, 0, 0).single()?;
                Some(Transaction {
                    id,
                    title: format!("Subscription #{id}"),
                    usd: 10.0,
                    naira: 15_000.0,
                    created_at,
                })
            })
            .collect();

        store.dashboard.total_subscribers = 1_250;
        store.dashboard.total_users = 5_000;
        store.dashboard.total_instructors = SEEDED_INSTRUCTORS as u64;
        store.dashboard.total_reports = 3;
        store.dashboard.total_revenue_usd = 10_700.0;
        store.dashboard.subscribers_history = (1..=8)
            .map(|m| SubscriberMonth {
                month: format!("2025-{m:02}"),
                count: m * 10,
            })
            .collect();
        // 2025-05 missing on purpose: charts fill gaps.
        store.dashboard.revenue_history = (1..=8)
            .filter(|m| *m != 5)
            .map(|m| RevenueMonth {
                month: format!("2025-{m:02}"),
                usd: m as f64 * 100.0,
                naira: m as f64 * 150_000.0,
            })
            .collect();

        store
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::seeded()
    }
}
