pub mod fetcher_process;
