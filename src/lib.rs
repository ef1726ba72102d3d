pub mod modules {
    pub mod config;

    pub mod udp_functions {
        pub mod receiver;
        pub mod udp;
        pub mod udp_test;
    }

    pub mod request_object {
        pub mod issue_init;
        pub mod request_init;
    }

    pub mod floor_object {
        pub mod floor_init;
    }

    pub mod cab_object {
        pub mod cab;
        pub mod cab_movement;
        pub mod cab_test;
    }

    pub mod elevator_functions {
        pub mod elevator_subsystem;
    }

    pub mod scheduler_functions {
        pub mod scheduler;
        pub mod scheduler_test;
    }

    pub mod floor_functions {
        pub mod floor_subsystem;
        pub mod scenario;
        pub mod scenario_test;
    }
}
