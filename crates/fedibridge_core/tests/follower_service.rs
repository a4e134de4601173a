mod common;

use common::{sync_status, TestDb};
use fedibridge_core::{FollowerService, RepoError, UnfollowOutcome, UNSYNCED_WATERMARK};

#[test]
fn follow_creates_missing_follower_with_unsynced_watermark() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service.follow("myhandle", "domain.ext", 12).unwrap();

    let follower = service.get_follower("myhandle", "domain.ext").unwrap().unwrap();
    assert_eq!(follower.id, id);
    assert_eq!(follower.followings, vec![12]);
    assert_eq!(
        follower.followings_sync_status,
        sync_status(&[(12, UNSYNCED_WATERMARK)])
    );
}

#[test]
fn follow_appends_to_existing_follower() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service
        .create_follower("myhandle", "domain.ext", &[12], &sync_status(&[(12, 165)]))
        .unwrap();
    assert_eq!(service.follow("myhandle", "domain.ext", 19).unwrap(), id);

    let follower = service.get_follower_by_id(id).unwrap().unwrap();
    assert_eq!(follower.followings, vec![12, 19]);
    assert_eq!(
        follower.followings_sync_status,
        sync_status(&[(12, 165), (19, UNSYNCED_WATERMARK)])
    );
    assert_eq!(service.get_followers(19).unwrap().len(), 1);
}

#[test]
fn repeated_follow_keeps_sync_progress() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service.follow("myhandle", "domain.ext", 12).unwrap();
    service.record_sync(id, 12, 500).unwrap();
    assert_eq!(service.follow("MyHandle", "domain.ext", 12).unwrap(), id);

    let follower = service.get_follower_by_id(id).unwrap().unwrap();
    assert_eq!(follower.followings, vec![12]);
    assert_eq!(follower.followings_sync_status, sync_status(&[(12, 500)]));
    assert_eq!(service.get_followers_count().unwrap(), 1);
}

#[test]
fn unfollow_removes_one_following() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service
        .create_follower(
            "myhandle",
            "domain.ext",
            &[12, 19],
            &sync_status(&[(12, 165), (19, 166)]),
        )
        .unwrap();

    let outcome = service.unfollow("myhandle", "domain.ext", 12).unwrap();
    assert_eq!(outcome, UnfollowOutcome::Updated(id));

    let follower = service.get_follower_by_id(id).unwrap().unwrap();
    assert_eq!(follower.followings, vec![19]);
    assert_eq!(follower.followings_sync_status, sync_status(&[(19, 166)]));
    assert!(service.get_followers(12).unwrap().is_empty());
}

#[test]
fn unfollow_last_following_deletes_follower() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service.follow("myhandle", "domain.ext", 12).unwrap();

    let outcome = service.unfollow("myhandle", "domain.ext", 12).unwrap();
    assert_eq!(outcome, UnfollowOutcome::Removed(id));
    assert!(service.get_follower("myhandle", "domain.ext").unwrap().is_none());
    assert_eq!(service.get_followers_count().unwrap(), 0);
}

#[test]
fn unfollow_without_relation_is_a_no_op() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    assert_eq!(
        service.unfollow("nobody", "domain.ext", 12).unwrap(),
        UnfollowOutcome::NotFollowing
    );

    service.follow("myhandle", "domain.ext", 12).unwrap();
    assert_eq!(
        service.unfollow("myhandle", "domain.ext", 19).unwrap(),
        UnfollowOutcome::NotFollowing
    );
    assert_eq!(
        service
            .get_follower("myhandle", "domain.ext")
            .unwrap()
            .unwrap()
            .followings,
        vec![12]
    );
}

#[test]
fn record_sync_updates_single_watermark() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service
        .create_follower(
            "myhandle",
            "domain.ext",
            &[12, 19],
            &sync_status(&[(12, 165), (19, 166)]),
        )
        .unwrap();
    service.record_sync(id, 19, 200).unwrap();

    let follower = service.get_follower_by_id(id).unwrap().unwrap();
    assert_eq!(follower.followings, vec![12, 19]);
    assert_eq!(
        follower.followings_sync_status,
        sync_status(&[(12, 165), (19, 200)])
    );
}

#[test]
fn record_sync_for_unknown_follower_returns_not_found() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let err = service.record_sync(404, 12, 1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn service_passes_through_delete_and_update() {
    let db = TestDb::new();
    let service = FollowerService::new(db.repo());

    let id = service.follow("myhandle", "domain.ext", 12).unwrap();
    service
        .update_follower(id, &[1, 2], &sync_status(&[(1, 10)]))
        .unwrap();
    assert_eq!(service.get_all_followers().unwrap()[0].followings, vec![1, 2]);

    service
        .delete_follower_by_handle("myhandle", "domain.ext")
        .unwrap();
    service.delete_follower(id).unwrap();
    assert!(service.get_all_followers().unwrap().is_empty());
}
