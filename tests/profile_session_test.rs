use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use hrm_core::domain::model::{NewUser, User, UserRole};
use hrm_core::domain::profile::{FieldPath, FamilyMemberField, Section};
use hrm_core::form::draft::draft_key;
use hrm_core::form::DraftStore;
use hrm_core::services::mock_store::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use hrm_core::{
    HrBackend, HrmError, MemoryStorage, MockStore, ProfileSession, ProfileSettings, Storage,
};
use tokio::time::Instant;

/// 刪除永遠失敗的儲存，其餘委派給記憶體儲存
#[derive(Clone, Default)]
struct StuckRemoveStorage {
    inner: MemoryStorage,
}

impl Storage for StuckRemoveStorage {
    async fn read(&self, key: &str) -> hrm_core::Result<Option<Vec<u8>>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, data: &[u8]) -> hrm_core::Result<()> {
        self.inner.write(key, data).await
    }

    async fn remove(&self, _key: &str) -> hrm_core::Result<()> {
        Err(std::io::Error::other("read-only volume").into())
    }
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 16, hour, min, 0).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 16).unwrap()
}

/// 建立一個員工帳號，並回傳後端與草稿共用的儲存
async fn setup() -> Result<(MockStore<MemoryStorage>, MemoryStorage, User)> {
    let storage = MemoryStorage::new();
    let backend = MockStore::new(storage.clone());
    let admin = backend
        .login(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
        .await?
        .user;
    let employee = backend
        .create_user(
            &admin,
            NewUser {
                email: "sita@hrm.com".to_string(),
                name: "Sita Sharma".to_string(),
                password: "pw".to_string(),
                role: Some(UserRole::Employee),
                ..NewUser::default()
            },
        )
        .await?;
    Ok((backend, storage, employee))
}

async fn fill_required<S: Storage>(session: &mut ProfileSession<S>, now: Instant) -> Result<()> {
    for (path, value) in [
        ("identification.accountHolderNameNepali", "सीता शर्मा"),
        ("identification.citizenshipNo", "12-01-75-01234"),
        ("identification.citizenshipIssuePlace", "Kathmandu"),
        ("identification.panNo", "123456789"),
    ] {
        session.change(path.parse::<FieldPath>()?, value, now)?;
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_edit_validate_and_submit() -> Result<()> {
    let (backend, storage, employee) = setup().await?;
    let (mut session, offer) = ProfileSession::open(
        employee.clone(),
        storage.clone(),
        None,
        at(9, 0),
        ProfileSettings::default(),
    )
    .await?;
    assert!(offer.is_none());
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.form().name, "Sita Sharma");

    // HR-owned fields stay read-only
    let err = session
        .change("name".parse::<FieldPath>()?, "Someone Else", Instant::now())
        .unwrap_err();
    assert!(matches!(err, HrmError::ValidationError { .. }));

    // realtime validation waits for the typing pause
    let start = Instant::now();
    session.nested_change(Section::CurrentAddress, "mobile", "12345", start)?;
    assert!(session.before_unload_warning());
    assert!(!session.poll_validation(start + std::time::Duration::from_millis(100)));
    tokio::time::advance(std::time::Duration::from_millis(600)).await;
    assert!(session.poll_validation(Instant::now()));
    assert_eq!(
        session.realtime_errors().get("currentAddress.mobile"),
        Some("Mobile must be 10 digits")
    );

    // submit is blocked while required fields are empty
    let err = session.submit(&backend).await.unwrap_err();
    match err {
        HrmError::FormValidation { errors } => {
            assert!(errors.contains_key("identification.panNo"));
            assert!(errors.contains_key("currentAddress.mobile"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(session.errors().contains("identification.citizenshipNo"));

    let now = Instant::now();
    fill_required(&mut session, now).await?;
    session.nested_change(Section::CurrentAddress, "mobile", "9841000000", now)?;
    session.set_bs_date("dobBS".parse::<FieldPath>()?, "2050-06-10", today(), now)?;
    assert_eq!(session.form().date_of_birth, "1993-09-26");
    assert_eq!(session.form().age, "32");
    session.edit_family(now, |family| {
        let id = family.add();
        family.update(&id, FamilyMemberField::Name, "Hari Sharma");
        family.update(&id, FamilyMemberField::Relationship, "Father");
    });

    // a draft written meanwhile is dropped once the save goes through
    assert!(session.autosave(at(9, 1)).await?);
    assert!(storage.keys().await.contains(&draft_key(&employee.id)));

    let saved = session.submit(&backend).await?;
    assert!(!session.has_unsaved_changes());
    assert!(!storage.keys().await.contains(&draft_key(&employee.id)));

    let profile = saved.profile.as_ref().map(|p| p.identification.pan_no.as_str());
    assert_eq!(profile, Some("123456789"));
    assert_eq!(saved.dob_bs.as_deref(), Some("2050-06-10"));
    assert_eq!(saved.dob_ad, NaiveDate::from_ymd_opt(1993, 9, 26));

    let reloaded = backend.get_user(&employee, &employee.id).await?;
    assert_eq!(
        reloaded.profile.map(|p| p.family_members.len()),
        Some(1)
    );
    Ok(())
}

#[tokio::test]
async fn test_autosave_only_when_dirty() -> Result<()> {
    let (_backend, storage, employee) = setup().await?;
    let (mut session, _) = ProfileSession::open(
        employee.clone(),
        storage.clone(),
        None,
        at(9, 0),
        ProfileSettings::default(),
    )
    .await?;

    // not due yet, then due but nothing changed
    assert!(!session.autosave(at(9, 0)).await?);
    assert!(!session.autosave(Utc.with_ymd_and_hms(2025, 10, 16, 9, 0, 30).unwrap()).await?);

    session.change(
        "religion".parse::<FieldPath>()?,
        "Hindu",
        Instant::now(),
    )?;
    assert!(!session.autosave(Utc.with_ymd_and_hms(2025, 10, 16, 9, 0, 45).unwrap()).await?);
    assert!(session.autosave(at(9, 1)).await?);
    assert_eq!(session.last_autosaved(), Some(at(9, 1)));
    Ok(())
}

#[tokio::test]
async fn test_draft_offer_restore_and_discard() -> Result<()> {
    let (_backend, storage, employee) = setup().await?;

    let (mut first, _) = ProfileSession::open(
        employee.clone(),
        storage.clone(),
        None,
        at(9, 0),
        ProfileSettings::default(),
    )
    .await?;
    first.change("religion".parse::<FieldPath>()?, "Buddhist", Instant::now())?;
    assert!(first.autosave(at(9, 1)).await?);
    drop(first);

    // the server copy changed after the draft was written
    let (mut second, offer) = ProfileSession::open(
        employee.clone(),
        storage.clone(),
        Some(at(9, 30)),
        at(10, 0),
        ProfileSettings::default(),
    )
    .await?;
    let offer = offer.expect("draft should be offered");
    assert!(offer.conflicts_with_server);
    assert_eq!(second.form().religion, "");

    second.restore_draft(offer);
    assert_eq!(second.form().religion, "Buddhist");
    assert!(second.has_unsaved_changes());

    second.discard_changes().await?;
    assert_eq!(second.form().religion, "");
    assert!(!second.has_unsaved_changes());
    assert!(DraftStore::new(storage.clone())
        .load(&employee.id, at(10, 0))
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_expired_draft_is_not_offered() -> Result<()> {
    let (_backend, storage, employee) = setup().await?;
    let drafts = DraftStore::new(storage.clone());
    let mut form = hrm_core::domain::profile::ProfileForm::from_user(&employee);
    form.nationality = "Nepali".to_string();
    drafts.save(&employee.id, &form, at(9, 0)).await?;

    let settings = ProfileSettings {
        draft_max_age: Duration::hours(1),
        ..ProfileSettings::default()
    };
    let (_session, offer) =
        ProfileSession::open(employee.clone(), storage.clone(), None, at(10, 30), settings).await?;
    assert!(offer.is_none());
    assert!(!storage.keys().await.contains(&draft_key(&employee.id)));
    Ok(())
}

#[tokio::test]
async fn test_submit_succeeds_when_draft_cleanup_fails() -> Result<()> {
    let (backend, _storage, employee) = setup().await?;
    let drafts = StuckRemoveStorage::default();
    let (mut session, _) = ProfileSession::open(
        employee.clone(),
        drafts.clone(),
        None,
        at(9, 0),
        ProfileSettings::default(),
    )
    .await?;

    let now = Instant::now();
    fill_required(&mut session, now).await?;
    session.nested_change(Section::CurrentAddress, "mobile", "9841000000", now)?;
    assert!(session.autosave(at(9, 1)).await?);

    let saved = session.submit(&backend).await?;
    assert!(!session.has_unsaved_changes());
    assert!(!session.before_unload_warning());
    assert_eq!(
        saved.profile.map(|p| p.identification.pan_no),
        Some("123456789".to_string())
    );
    // the draft could not be removed and is still on disk
    assert!(drafts.inner.keys().await.contains(&draft_key(&employee.id)));
    Ok(())
}
