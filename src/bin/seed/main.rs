//! Seeds a development database with departments, accounts and sample
//! content. Safe to run only against an empty database; it does not
//! upsert.

use anyhow::Context;
use atrium::approval::ContentStatus;
use atrium::orm::users::Role;
use atrium::orm::{departments, documents, events, posts, users};
use atrium::session;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    session::init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = Database::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    if users::Entity::find().count(&db).await? > 0 {
        anyhow::bail!("database already has users; refusing to seed");
    }

    seed(&db).await?;
    log::info!("seed complete; default password for every account is \"matkhau123\"");
    Ok(())
}

async fn seed(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now().naive_utc();
    let password = session::hash_password("matkhau123")
        .map_err(|err| anyhow::anyhow!("password hashing failed: {}", err))?;

    let department_names = [
        ("Phòng Nhân sự", "Quản lý nhân sự và tuyển dụng"),
        ("Phòng Kỹ thuật", "Phát triển và vận hành hệ thống"),
        ("Phòng Kế toán", "Tài chính và kế toán"),
        ("Phòng Hành chính", "Hành chính tổng hợp"),
    ];

    let mut department_ids = Vec::new();
    for (name, description) in department_names {
        let department = departments::ActiveModel {
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        log::info!("created department {} ({})", department.name, department.id);
        department_ids.push(department.id);
    }

    let admin = users::ActiveModel {
        name: Set("Nguyễn Văn Quản".to_string()),
        email: Set("admin@congty.vn".to_string()),
        password: Set(password.clone()),
        role: Set(Role::Admin),
        department_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let head_hr = users::ActiveModel {
        name: Set("Trần Thị Hạnh".to_string()),
        email: Set("hanh.tran@congty.vn".to_string()),
        password: Set(password.clone()),
        role: Set(Role::DepartmentHead),
        department_id: Set(Some(department_ids[0])),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let head_eng = users::ActiveModel {
        name: Set("Lê Minh Tuấn".to_string()),
        email: Set("tuan.le@congty.vn".to_string()),
        password: Set(password.clone()),
        role: Set(Role::DepartmentHead),
        department_id: Set(Some(department_ids[1])),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (name, email, department) in [
        ("Phạm Thu Trang", "trang.pham@congty.vn", department_ids[0]),
        ("Hoàng Đức Anh", "anh.hoang@congty.vn", department_ids[1]),
        ("Vũ Thị Mai", "mai.vu@congty.vn", department_ids[2]),
    ] {
        users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password: Set(password.clone()),
            role: Set(Role::Employee),
            department_id: Set(Some(department)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    // An approved company-wide announcement from the admin and a
    // pending department post from a head, so the review screen has
    // something in every state.
    posts::ActiveModel {
        title: Set("Chào mừng đến với cổng thông tin nội bộ".to_string()),
        content: Set("Cổng thông tin mới thay thế bảng tin cũ từ tháng này.".to_string()),
        tags: Set(serde_json::json!(["thông báo", "chung"])),
        author_id: Set(admin.id),
        department_id: Set(None),
        is_public: Set(true),
        status: Set(ContentStatus::Approved),
        reviewed_by_id: Set(Some(admin.id)),
        reviewed_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    posts::ActiveModel {
        title: Set("Kế hoạch tuyển dụng quý 3".to_string()),
        content: Set("Phòng Nhân sự dự kiến tuyển 5 vị trí trong quý 3.".to_string()),
        tags: Set(serde_json::json!(["nhân sự"])),
        author_id: Set(head_hr.id),
        department_id: Set(Some(department_ids[0])),
        is_public: Set(false),
        status: Set(ContentStatus::Pending),
        reviewed_by_id: Set(None),
        reviewed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    documents::ActiveModel {
        title: Set("Quy trình triển khai hệ thống".to_string()),
        description: Set("Tài liệu hướng dẫn quy trình triển khai cho đội kỹ thuật.".to_string()),
        file_url: Set(Some("/files/quy-trinh-trien-khai.pdf".to_string())),
        uploaded_by_id: Set(head_eng.id),
        department_id: Set(Some(department_ids[1])),
        is_public: Set(false),
        status: Set(ContentStatus::Pending),
        reviewed_by_id: Set(None),
        reviewed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    events::ActiveModel {
        title: Set("Họp toàn công ty".to_string()),
        description: Set("Tổng kết quý và kế hoạch quý tới.".to_string()),
        location: Set(Some("Hội trường tầng 5".to_string())),
        starts_at: Set(now + Duration::days(7)),
        ends_at: Set(Some(now + Duration::days(7) + Duration::hours(2))),
        created_by_id: Set(admin.id),
        department_id: Set(None),
        is_public: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(())
}
