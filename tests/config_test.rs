use jobqueue::config::{Config, DEFAULT_CAPACITY, DEFAULT_QUEUE_NAME, QueueConfig};

// Env vars are process-global, so every env-mutating check lives in this one test.
#[test]
fn config_from_env_reads_and_validates_capacity() {
    unsafe {
        std::env::remove_var("JOBQUEUE_NAME");
        std::env::remove_var("JOBQUEUE_CAPACITY");
    }
    let config = Config::from_env().unwrap();
    assert_eq!(config.queue_name, DEFAULT_QUEUE_NAME);
    assert_eq!(config.queue_capacity, DEFAULT_CAPACITY);
    assert!(!config.log_level.is_empty());

    unsafe {
        std::env::set_var("JOBQUEUE_NAME", "deploys");
        std::env::set_var("JOBQUEUE_CAPACITY", "8");
    }
    let queue = Config::from_env().unwrap().queue_config();
    assert_eq!(queue.name, "deploys");
    assert_eq!(queue.capacity.get(), 8);

    unsafe {
        std::env::set_var("JOBQUEUE_CAPACITY", "0");
    }
    assert!(Config::from_env().is_err());

    unsafe {
        std::env::set_var("JOBQUEUE_CAPACITY", "lots");
    }
    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("JOBQUEUE_CAPACITY"));

    unsafe {
        std::env::remove_var("JOBQUEUE_NAME");
        std::env::remove_var("JOBQUEUE_CAPACITY");
    }
}

#[test]
fn queue_config_defaults_to_hundred_slots() {
    let config = QueueConfig::default();
    assert_eq!(config.capacity.get(), 100);
    assert_eq!(config.name, "job-queue");
}

#[test]
fn queue_config_rejects_zero_capacity() {
    assert!(QueueConfig::new("empty", 0).is_err());
    assert_eq!(QueueConfig::new("one", 1).unwrap().capacity.get(), 1);
}
