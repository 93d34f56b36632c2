use deadpool_postgres::Pool;

use crate::error::Error;

/// Creates every table if absent, then runs additive column migrations.
/// Mirrors the reference platform's bootstrap convention: schema creation
/// plus `ADD COLUMN IF NOT EXISTS` migrations, run once on boot.
pub async fn init_schema(pool: &Pool) -> Result<(), Error> {
    let client = pool.get().await?;

    client
        .batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS cameras (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                protocol TEXT NOT NULL,
                location TEXT,
                source_url TEXT,
                device_path TEXT,
                node_name TEXT,
                deployment_name TEXT,
                service_name TEXT,
                stream_port INT,
                control_port INT,
                status TEXT NOT NULL,
                resolution_width INT NOT NULL DEFAULT 640,
                resolution_height INT NOT NULL DEFAULT 480,
                framerate INT NOT NULL DEFAULT 15,
                metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_cameras_usb_device
                ON cameras (node_name, device_path)
                WHERE protocol = 'usb';

            CREATE TABLE IF NOT EXISTS recordings (
                id TEXT PRIMARY KEY,
                camera_id UUID REFERENCES cameras(id) ON DELETE SET NULL,
                camera_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_name TEXT NOT NULL,
                start_time TIMESTAMPTZ NOT NULL,
                end_time TIMESTAMPTZ,
                duration_seconds BIGINT,
                file_size_bytes BIGINT,
                status TEXT NOT NULL,
                error_message TEXT,
                node_name TEXT,
                camera_deleted BOOLEAN NOT NULL DEFAULT false
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_recordings_one_active
                ON recordings (camera_id)
                WHERE status = 'recording';

            CREATE INDEX IF NOT EXISTS idx_recordings_camera_id ON recordings (camera_id);

            CREATE TABLE IF NOT EXISTS agents (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                api_key_ref TEXT,
                system_prompt TEXT,
                temperature REAL NOT NULL DEFAULT 1.0,
                max_tokens INT NOT NULL DEFAULT 4096,
                channel_type TEXT,
                channel_config JSONB,
                tools JSONB NOT NULL DEFAULT '[]'::jsonb,
                status TEXT NOT NULL,
                deployment_name TEXT,
                service_name TEXT,
                node_name TEXT,
                cpu_limit TEXT NOT NULL DEFAULT '500m',
                memory_limit TEXT NOT NULL DEFAULT '512Mi',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE TABLE IF NOT EXISTS chat_sessions (
                id UUID PRIMARY KEY,
                name TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE TABLE IF NOT EXISTS chat_messages (
                id UUID PRIMARY KEY,
                session_id UUID NOT NULL REFERENCES chat_sessions(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages (session_id, created_at);

            CREATE TABLE IF NOT EXISTS agent_chat_messages (
                id UUID PRIMARY KEY,
                agent_id UUID NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                source_user TEXT,
                prompt_tokens INT,
                completion_tokens INT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE INDEX IF NOT EXISTS idx_agent_chat_messages_session
                ON agent_chat_messages (agent_id, session_id, created_at);

            CREATE TABLE IF NOT EXISTS cron_jobs (
                id UUID PRIMARY KEY,
                agent_id UUID NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
                session_id TEXT NOT NULL DEFAULT '',
                cron_expr TEXT NOT NULL,
                timezone TEXT NOT NULL DEFAULT 'UTC',
                prompt TEXT NOT NULL,
                timeout_seconds INT NOT NULL DEFAULT 120,
                enabled BOOLEAN NOT NULL DEFAULT true,
                last_status TEXT,
                last_run_at TIMESTAMPTZ,
                last_summary TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            "#,
        )
        .await
        .map_err(Error::from_postgres)?;

    // Additive migrations for databases created by earlier revisions.
    client
        .batch_execute(
            r#"
            ALTER TABLE cameras ADD COLUMN IF NOT EXISTS metadata JSONB NOT NULL DEFAULT '{}'::jsonb;
            ALTER TABLE recordings ADD COLUMN IF NOT EXISTS camera_deleted BOOLEAN NOT NULL DEFAULT false;
            ALTER TABLE agents ADD COLUMN IF NOT EXISTS tools JSONB NOT NULL DEFAULT '[]'::jsonb;
            ALTER TABLE cron_jobs ADD COLUMN IF NOT EXISTS session_id TEXT NOT NULL DEFAULT '';
            "#,
        )
        .await
        .map_err(Error::from_postgres)?;

    tracing::info!("database schema initialized");
    Ok(())
}
