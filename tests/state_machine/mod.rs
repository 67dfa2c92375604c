mod concurrency;
mod scenarios;
mod timing;
