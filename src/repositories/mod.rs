pub mod dataset_repo;
