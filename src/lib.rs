pub mod application {
    pub mod context;
    pub mod services {
        pub mod delivery_executor;
        pub mod reliability_monitor;
    }
    pub mod usecases {
        pub mod deliver_webhook;
        pub mod list_webhooks;
        pub mod publish_event;
        pub mod register_webhook;
        pub mod test_webhook;
        pub mod unregister_webhook;
        pub mod update_webhook;
    }
}
pub mod config;
pub mod domain {
    pub mod entities {
        pub mod subscription;
    }
    pub mod services {
        pub mod signer;
        pub mod url_guard;
    }
    pub mod value_objects {
        pub mod ids;
        pub mod timestamps;
    }
    pub mod workflows {
        pub mod reliability;
        pub mod retry_policy;
    }
}
pub mod infrastructure;
pub mod interface {
    pub mod http;
}
pub mod observability;
