//! Lua scripts for the Redis rate-limit gate

// Lua script to atomically take one unit of budget from a fixed window
// The key holds the remaining budget and expires when the window ends. Pausing the gate
// sets the key to 0 with the pause duration as expiry.
//
// KEYS[1]: budget key
// ARGV[1]: calls allowed per window
// ARGV[2]: window length in milliseconds
//
// Returns:
//   1 if budget was acquired
//   0 if the budget is exhausted or the gate is paused
pub static ACQUIRE_BUDGET_SCRIPT: &str = r#"
local key = KEYS[1]
local limit = tonumber(ARGV[1])
local window_ms = tonumber(ARGV[2])

local remaining = redis.call('GET', key)
if not remaining then
    if limit <= 0 then
        return 0
    end

    -- First call of the window, start a new window with the call already taken
    redis.call('SET', key, limit - 1, 'PX', window_ms)
    return 1
end

if tonumber(remaining) > 0 then
    redis.call('DECR', key)
    return 1
end

return 0
"#;
