//! Demo data for a fresh database: three accounts, a small category tree and
//! a page of approved listings.

use tracing::info;
use uuid::Uuid;

use shop_db::{Database, NewProduct, NewProfile, NewUser};
use shop_types::models::{ProductStatus, Role};

use crate::auth::hash_password;
use crate::error::ApiError;

struct DemoAccount {
    username: &'static str,
    password: &'static str,
    name: &'static str,
    phone: &'static str,
    role: Role,
    business_name: &'static str,
    business_number: &'static str,
}

const ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        username: "admin",
        password: "admin1234",
        name: "관리자",
        phone: "010-0000-0000",
        role: Role::Admin,
        business_name: "가설마켓 운영팀",
        business_number: "000-00-00000",
    },
    DemoAccount {
        username: "seller",
        password: "seller1234",
        name: "김판매",
        phone: "010-1111-1111",
        role: Role::User,
        business_name: "대박가설",
        business_number: "123-45-67890",
    },
    DemoAccount {
        username: "buyer",
        password: "buyer1234",
        name: "이구매",
        phone: "010-2222-2222",
        role: Role::User,
        business_name: "튼튼건설",
        business_number: "987-65-43210",
    },
];

/// Root name and its children.
const CATEGORIES: [(&str, [&str; 3]); 2] = [
    ("가설재", ["파이프", "안전발판", "써포트"]),
    ("유로폼", ["신재", "고재", "쇼트"]),
];

const PRODUCT_COUNT: usize = 20;

/// Seed only when the database has no users. Returns whether anything was written.
pub fn seed_demo_data(db: &Database) -> Result<bool, ApiError> {
    if db.count_users()? > 0 {
        return Ok(false);
    }

    let admin_id = Uuid::new_v4().to_string();
    let mut seller_id = String::new();
    for account in &ACCOUNTS {
        let user_id = if account.role == Role::Admin {
            admin_id.clone()
        } else {
            Uuid::new_v4().to_string()
        };
        let password_hash = hash_password(account.password)?;
        let profile_id = Uuid::new_v4().to_string();

        db.create_user_with_profile(
            &NewUser {
                id: &user_id,
                username: account.username,
                password_hash: &password_hash,
                name: account.name,
                phone: account.phone,
                email: None,
                role: account.role,
                business_number: Some(account.business_number),
            },
            Some(&NewProfile {
                id: &profile_id,
                user_id: &user_id,
                business_name: account.business_name,
                business_number: account.business_number,
                representative_name: Some(account.name),
                office_address: Some("서울특별시 강남구 테헤란로 1"),
                storage_address: Some("경기도 화성시 야적장 1"),
            }),
        )?;
        db.approve_profile(&profile_id, &admin_id)?;

        if account.username == "seller" {
            seller_id = user_id;
        }
    }

    let mut leaves: Vec<(String, &str)> = Vec::new();
    for (order, (root, children)) in CATEGORIES.iter().enumerate() {
        let root_id = Uuid::new_v4().to_string();
        db.create_category(&root_id, None, root, None, order as i64 + 1)?;
        for (child_order, child) in children.iter().enumerate() {
            let child_id = Uuid::new_v4().to_string();
            db.create_category(&child_id, Some(root_id.as_str()), child, None, child_order as i64 + 1)?;
            leaves.push((child_id, *child));
        }
    }

    for i in 0..PRODUCT_COUNT {
        let (category_id, category_name) = &leaves[i % leaves.len()];
        let id = Uuid::new_v4().to_string();
        let item_name = format!("{} {}호", category_name, i + 1);
        let slug = format!("demo-{}-{}", i + 1, &id[..8]);
        let condition = if i % 3 == 0 { "used" } else { "new" };
        let image_urls = vec![format!("https://picsum.photos/seed/shop{}/600/400", i + 1)];

        db.create_product(
            &NewProduct {
                id: &id,
                slug: &slug,
                category_id,
                seller_id: &seller_id,
                item_name: &item_name,
                item_condition: condition,
                spec: Some("규격 표준"),
                unit_price: 1_000 * (i as i64 + 1),
                sale_unit: "개",
                stock_quantity: 100,
                loading_address: Some("경기도 화성시 야적장 1"),
                loading_address_display: Some("경기 화성"),
                description: None,
                status: ProductStatus::Selling,
                is_displayed: true,
            },
            &image_urls,
        )?;
    }

    info!(
        "Seeded demo data: {} accounts, {} categories, {} products",
        ACCOUNTS.len(),
        leaves.len() + CATEGORIES.len(),
        PRODUCT_COUNT
    );
    Ok(true)
}
