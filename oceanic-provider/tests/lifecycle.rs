//! End-to-end lifecycle tests against the scripted in-memory control plane.

use std::sync::Arc;
use std::time::{Duration, Instant};

use oceanic_fields::{ConfigValue, ResourceConfig};
use oceanic_provider::fields::{cluster, instance_types, launch_config, strategy};
use oceanic_provider::{
    policy, ClusterController, ControllerConfig, CreateRetry, ProviderError, ResourceState,
};
use oceanic_sdk::mock::{ApiCall, MockOceanApi};
use oceanic_sdk::{ApiError, Cluster, ERR_CODE_INVALID_PARAMETER};

const SETTLE: Duration = Duration::from_millis(100);

fn fast_config() -> ControllerConfig {
    ControllerConfig {
        settle_delay: SETTLE,
        create_retry: CreateRetry {
            timeout: Duration::from_millis(200),
            delay: Duration::from_millis(10),
        },
    }
}

fn controller(api: Arc<MockOceanApi>) -> ClusterController<Arc<MockOceanApi>> {
    ClusterController::with_config(api, fast_config()).unwrap()
}

fn base_config() -> ResourceConfig {
    let mut config = ResourceConfig::new();
    config.set(cluster::NAME, "prod");
    config.set(cluster::REGION, "us-west-2");
    config.set(cluster::CONTROLLER_CLUSTER_ID, "prod-ctrl");
    config.set(cluster::MAX_SIZE, 10i64);
    config.set(strategy::SPOT_PERCENTAGE, 80i64);
    config
}

fn update_policy(should_roll: bool, conditioned: bool, auto_tags: bool) -> ConfigValue {
    ConfigValue::map([
        (policy::SHOULD_ROLL, ConfigValue::from(should_roll)),
        (policy::CONDITIONED_ROLL, ConfigValue::from(conditioned)),
        (policy::AUTO_APPLY_TAGS, ConfigValue::from(auto_tags)),
        (
            policy::ROLL_CONFIG,
            ConfigValue::map([(policy::BATCH_SIZE_PERCENTAGE, ConfigValue::from(25i64))]),
        ),
    ])
}

/// Create a cluster and hand back its state plus the shared mock.
async fn created(
    config: ResourceConfig,
) -> (Arc<MockOceanApi>, ClusterController<Arc<MockOceanApi>>, ResourceState) {
    let api = Arc::new(MockOceanApi::new());
    let controller = controller(Arc::clone(&api));
    let mut state = ResourceState::new(config);
    controller.create(&mut state).await.unwrap();
    (api, controller, state)
}

#[test_log::test(tokio::test)]
async fn create_assigns_identity_and_reads_back() {
    let (api, _, state) = created(base_config()).await;

    let id = state.id.clone().unwrap();
    assert!(id.starts_with("o-"));
    assert_eq!(api.call_names(), vec!["create_cluster", "read_cluster"]);

    // read-back refreshed the configuration from the control plane
    assert_eq!(state.config.get_str(cluster::NAME).unwrap(), Some("prod"));
    assert_eq!(
        state.config.get_i64(strategy::SPOT_PERCENTAGE).unwrap(),
        Some(80)
    );
}

#[test_log::test(tokio::test)]
async fn create_without_launch_profile_skips_the_settle_delay() {
    let start = Instant::now();
    let (_, _, _) = created(base_config()).await;
    assert!(start.elapsed() < SETTLE);
}

#[test_log::test(tokio::test)]
async fn create_with_launch_profile_waits_for_propagation() {
    let mut config = base_config();
    config.set(launch_config::LAUNCH_PROFILE_NAME, "profile-1");

    let start = Instant::now();
    let (_, _, state) = created(config).await;
    assert!(start.elapsed() >= SETTLE);
    assert!(state.id.is_some());
}

#[test_log::test(tokio::test)]
async fn create_failure_is_not_retried() {
    let api = Arc::new(MockOceanApi::new());
    api.push_create_result(Err(ApiError::new("GENERAL_ERROR", "boom")));
    let controller = controller(Arc::clone(&api));

    let mut state = ResourceState::new(base_config());
    let err = controller.create(&mut state).await.unwrap_err();
    assert!(matches!(err, ProviderError::Create { .. }));
    assert_eq!(api.call_count("create_cluster"), 1);
    assert!(state.id.is_none());
}

#[test_log::test(tokio::test)]
async fn rejected_launch_profile_is_not_retried_either() {
    let api = Arc::new(MockOceanApi::new());
    api.push_create_result(Err(ApiError::new(
        ERR_CODE_INVALID_PARAMETER,
        "Invalid launch profile: profile-1",
    )));
    let controller = controller(Arc::clone(&api));

    let mut state = ResourceState::new(base_config());
    assert!(controller.create(&mut state).await.is_err());
    assert_eq!(api.call_count("create_cluster"), 1);
}

#[test_log::test(tokio::test)]
async fn create_response_without_id_errors() {
    let api = Arc::new(MockOceanApi::new());
    api.push_create_result(Ok(Cluster::default()));
    let controller = controller(Arc::clone(&api));

    let mut state = ResourceState::new(base_config());
    let err = controller.create(&mut state).await.unwrap_err();
    assert!(matches!(err, ProviderError::MissingClusterId));
}

#[test_log::test(tokio::test)]
async fn read_of_vanished_cluster_clears_identity() {
    let (api, controller, mut state) = created(base_config()).await;
    api.push_read_result(Err(ApiError::cluster_not_found("o-000001")));

    controller.read(&mut state).await.unwrap();
    assert!(state.id.is_none());
}

#[test_log::test(tokio::test)]
async fn read_answering_no_object_also_clears_identity() {
    let (api, controller, mut state) = created(base_config()).await;
    api.push_read_result(Ok(None));

    controller.read(&mut state).await.unwrap();
    assert!(state.id.is_none());
}

#[test_log::test(tokio::test)]
async fn read_without_identity_is_a_no_op() {
    let api = Arc::new(MockOceanApi::new());
    let controller = controller(Arc::clone(&api));

    let mut state = ResourceState::new(base_config());
    controller.read(&mut state).await.unwrap();
    assert!(api.calls().is_empty());
}

#[test_log::test(tokio::test)]
async fn unchanged_update_only_reads() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(
        api.call_names(),
        vec!["create_cluster", "read_cluster", "read_cluster"]
    );
}

#[test_log::test(tokio::test)]
async fn update_without_policy_never_rolls() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(strategy::SPOT_PERCENTAGE, 50i64);

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(api.call_count("update_cluster"), 1);
    assert_eq!(api.call_count("create_roll"), 0);
    assert_eq!(
        state.config.get_i64(strategy::SPOT_PERCENTAGE).unwrap(),
        Some(50)
    );
}

#[test_log::test(tokio::test)]
async fn unconditional_roll_policy_rolls_on_any_change() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(strategy::SPOT_PERCENTAGE, 50i64);
    state
        .config
        .set(policy::UPDATE_POLICY, update_policy(true, false, false));

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(api.call_count("create_roll"), 1);

    let roll = api
        .calls()
        .into_iter()
        .find_map(|call| match call {
            ApiCall::CreateRoll(spec) => Some(spec),
            _ => None,
        })
        .unwrap();
    assert_eq!(roll.cluster_id, state.id);
    assert_eq!(roll.batch_size_percentage, Some(25));
}

#[test_log::test(tokio::test)]
async fn conditioned_roll_ignores_non_trigger_changes() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(launch_config::KEY_PAIR, "new-key");
    state
        .config
        .set(policy::UPDATE_POLICY, update_policy(true, true, false));

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(api.call_count("update_cluster"), 1);
    assert_eq!(api.call_count("create_roll"), 0);
}

#[test_log::test(tokio::test)]
async fn conditioned_roll_fires_on_trigger_change() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(launch_config::IMAGE_ID, "img-2");
    state
        .config
        .set(policy::UPDATE_POLICY, update_policy(true, true, false));

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(api.call_count("create_roll"), 1);
}

#[test_log::test(tokio::test)]
async fn tags_only_change_rolls_under_conditioned_policy() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(
        launch_config::TAGS,
        ConfigValue::map([("env", ConfigValue::from("stage"))]),
    );
    state
        .config
        .set(policy::UPDATE_POLICY, update_policy(true, true, false));

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(api.call_count("create_roll"), 1);
}

#[test_log::test(tokio::test)]
async fn auto_applied_tags_do_not_roll() {
    let (api, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(
        launch_config::TAGS,
        ConfigValue::map([("env", ConfigValue::from("stage"))]),
    );
    state
        .config
        .set(policy::UPDATE_POLICY, update_policy(true, true, true));

    controller.update(&mut state, &prev).await.unwrap();
    assert_eq!(api.call_count("update_cluster"), 1);
    assert_eq!(api.call_count("create_roll"), 0);
}

#[test_log::test(tokio::test)]
async fn removed_list_field_is_cleared_remotely() {
    let mut config = base_config();
    config.set(
        instance_types::WHITELIST,
        ConfigValue::string_list(["m5.large"]),
    );
    let (api, controller, mut state) = created(config).await;

    let prev = state.config.clone();
    state.config.remove(instance_types::WHITELIST);
    controller.update(&mut state, &prev).await.unwrap();

    let updated = api
        .calls()
        .into_iter()
        .find_map(|call| match call {
            ApiCall::UpdateCluster(cluster) => Some(cluster),
            _ => None,
        })
        .unwrap();
    assert_eq!(updated.instance_types().unwrap().whitelist, None);
}

#[test_log::test(tokio::test)]
async fn failed_roll_aborts_but_the_update_sticks() {
    let (api, controller, mut state) = created(base_config()).await;
    api.push_roll_result(Err(ApiError::new("GENERAL_ERROR", "roll rejected")));

    let prev = state.config.clone();
    state.config.set(strategy::SPOT_PERCENTAGE, 50i64);
    state
        .config
        .set(policy::UPDATE_POLICY, update_policy(true, false, false));

    let err = controller.update(&mut state, &prev).await.unwrap_err();
    assert!(matches!(err, ProviderError::RollFailed { .. }));
    assert_eq!(api.call_count("update_cluster"), 1);

    // the remote update already applied; a fresh read observes it
    controller.read(&mut state).await.unwrap();
    assert_eq!(
        state.config.get_i64(strategy::SPOT_PERCENTAGE).unwrap(),
        Some(50)
    );
}

#[test_log::test(tokio::test)]
async fn roll_with_policy_but_no_roll_config_errors() {
    let (_, controller, mut state) = created(base_config()).await;
    let prev = state.config.clone();
    state.config.set(strategy::SPOT_PERCENTAGE, 50i64);
    state.config.set(
        policy::UPDATE_POLICY,
        ConfigValue::map([(policy::SHOULD_ROLL, ConfigValue::from(true))]),
    );

    let err = controller.update(&mut state, &prev).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::MissingRollConfiguration { .. }
    ));
}

#[test_log::test(tokio::test)]
async fn roll_without_policy_errors() {
    let (_, controller, state) = created(base_config()).await;
    let id = state.id.unwrap();

    let err = controller
        .roll(&id, &ResourceConfig::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingUpdatePolicy { .. }));
}

#[test_log::test(tokio::test)]
async fn update_before_create_errors() {
    let api = Arc::new(MockOceanApi::new());
    let controller = controller(Arc::clone(&api));

    let mut state = ResourceState::new(base_config());
    let prev = state.config.clone();
    let err = controller.update(&mut state, &prev).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotCreated));
}

#[test_log::test(tokio::test)]
async fn delete_clears_identity() {
    let (api, controller, mut state) = created(base_config()).await;

    controller.delete(&mut state).await.unwrap();
    assert!(state.id.is_none());
    assert!(api.stored_cluster().is_none());
}

#[test_log::test(tokio::test)]
async fn failed_delete_keeps_identity() {
    let (api, controller, mut state) = created(base_config()).await;
    api.push_delete_result(Err(ApiError::new("GENERAL_ERROR", "still draining")));

    let err = controller.delete(&mut state).await.unwrap_err();
    assert!(matches!(err, ProviderError::Delete { .. }));
    assert!(state.id.is_some());
}

#[test_log::test(tokio::test)]
async fn delete_without_identity_is_a_no_op() {
    let api = Arc::new(MockOceanApi::new());
    let controller = controller(Arc::clone(&api));

    let mut state = ResourceState::new(base_config());
    controller.delete(&mut state).await.unwrap();
    assert!(api.calls().is_empty());
}
