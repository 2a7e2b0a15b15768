//! Lua scripts for WorkerQueue redis implementation

// Lua script to atomically check for duplicates and add job to sorted set
// Uses ZSET for scheduling with the job identity as member (leverages native uniqueness).
// The identity is the job's JSON encoding, so no separate payload storage is needed.
//
// KEYS[1]: sorted set key (queue name)
// ARGV[1]: identity string
// ARGV[2]: score (timestamp in milliseconds the job becomes due)
//
// Returns:
//   1 if job was added
//   0 if job with same identity already exists
pub static PUSH_JOB_SCRIPT: &str = r#"
local queue_key = KEYS[1]
local identity = ARGV[1]
local score = tonumber(ARGV[2])

-- Check if identity already exists in queue (O(1) operation)
local exists = redis.call('ZSCORE', queue_key, identity)
if exists then
    return 0
end

redis.call('ZADD', queue_key, score, identity)
return 1
"#;

// Lua script to atomically take the earliest due job from the queue
// Only jobs whose score is at or before the provided timestamp are considered, so jobs
// scheduled for the future stay queued. Concurrent dispatchers never receive the same job.
//
// KEYS[1]: sorted set key (queue name)
// ARGV[1]: current timestamp in milliseconds
//
// Returns: the job identity, or false when no job is due
pub static POP_DUE_JOB_SCRIPT: &str = r#"
local queue_key = KEYS[1]
local now = tonumber(ARGV[1])

local due = redis.call('ZRANGEBYSCORE', queue_key, '-inf', now, 'LIMIT', 0, 1)
if #due == 0 then
    return false
end

redis.call('ZREM', queue_key, due[1])
return due[1]
"#;

// Lua script to remove stale jobs from the queue
// Removes all jobs with score (timestamp) older than the provided cutoff
//
// KEYS[1]: sorted set key (queue name)
// ARGV[1]: cutoff score (timestamp) - jobs older than this will be removed
//
// Returns: number of jobs removed
pub static CLEANUP_STALE_JOBS_SCRIPT: &str = r#"
local queue_key = KEYS[1]
local cutoff_score = tonumber(ARGV[1])

-- Remove all jobs with score less than cutoff (ZREMRANGEBYSCORE is O(log(N)+M))
local removed = redis.call('ZREMRANGEBYSCORE', queue_key, '-inf', cutoff_score)
return removed
"#;
