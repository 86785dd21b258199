// Image records hang off the chat message they were posted in.

pub const TABLE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id SERIAL,
    message TEXT NOT NULL,
    player VARCHAR(255) NOT NULL,
    channel VARCHAR(255) NOT NULL,
    created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (id)
)"#;

pub const TABLE_IMAGES: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id SERIAL,
    url VARCHAR(2000) NOT NULL,
    done BOOL NOT NULL DEFAULT 0,
    kuid INT NOT NULL DEFAULT 0,
    created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    message_id BIGINT UNSIGNED NOT NULL,
    PRIMARY KEY (id),
    FOREIGN KEY (message_id) REFERENCES messages(id)
)"#;

/// Creation order; drop in reverse
pub const TABLES: [(&str, &str); 2] = [("messages", TABLE_MESSAGES), ("images", TABLE_IMAGES)];
