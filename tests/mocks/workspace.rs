//! Temporary workspace builder.
//!
//! Layout produced:
//!
//! ```text
//! <tmp>/
//!   ws/
//!     <App>.module/        <- project passed to the checks
//!     <App>.parent/
//!     <App>/META-INF/      <- tier files
//!   gv/                    <- baseline directory
//!     predefined_<TIER>.substvar
//! ```

use bw_preflight::{PreflightConfig, Tier};
use quick_xml::escape::escape;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Connection prefix of the credential variables
pub const CONN: &str = "//common-om-connections///Connections/JDBC/Postgres_Appl/";

/// Fully-qualified name of a credential variable, e.g. `conn("USER")`
pub fn conn(key: &str) -> String {
    format!("{}{}", CONN, key)
}

/// Render variables as a substvar document the way the designer writes them.
pub fn substvar_xml<N: AsRef<str>, V: AsRef<str>>(vars: &[(N, V)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <repository xmlns=\"http://www.tibco.com/xmlns/repo/types/2002\">\n\
         \x20   <globalVariables>\n",
    );
    for (name, value) in vars {
        xml.push_str(&format!(
            "        <globalVariable>\n\
             \x20           <name>{}</name>\n\
             \x20           <value>{}</value>\n\
             \x20           <deploymentSettable>true</deploymentSettable>\n\
             \x20           <serviceSettable>false</serviceSettable>\n\
             \x20           <type>String</type>\n\
             \x20           <modTime>1520000000000</modTime>\n\
             \x20       </globalVariable>\n",
            escape(name.as_ref()),
            escape(value.as_ref())
        ));
    }
    xml.push_str("    </globalVariables>\n</repository>\n");
    xml
}

/// A workspace on disk, removed when dropped.
pub struct MockWorkspace {
    dir: TempDir,
    app: String,
}

impl MockWorkspace {
    /// Create a workspace holding the `.module` and `.parent` folders of `app`.
    pub fn new(app: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let ws = dir.path().join("ws");
        fs::create_dir_all(ws.join(format!("{}.module", app))).expect("create module dir");
        fs::create_dir_all(ws.join(format!("{}.parent", app))).expect("create parent dir");
        fs::create_dir_all(dir.path().join("gv")).expect("create baseline dir");
        MockWorkspace {
            dir,
            app: app.to_string(),
        }
    }

    /// Project directory (the `.module` folder)
    pub fn project(&self) -> PathBuf {
        self.dir.path().join("ws").join(format!("{}.module", self.app))
    }

    /// Application module's META-INF folder
    pub fn meta_inf(&self) -> PathBuf {
        self.dir.path().join("ws").join(&self.app).join("META-INF")
    }

    pub fn baseline_dir(&self) -> PathBuf {
        self.dir.path().join("gv")
    }

    pub fn baseline_path(&self, tier: Tier) -> PathBuf {
        self.baseline_dir().join(tier.baseline_file_name())
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn with_tier_file<N: AsRef<str>, V: AsRef<str>>(self, tier: Tier, vars: &[(N, V)]) -> Self {
        self.with_raw_tier_file(tier, &substvar_xml(vars))
    }

    pub fn with_raw_tier_file(self, tier: Tier, content: &str) -> Self {
        let meta = self.meta_inf();
        fs::create_dir_all(&meta).expect("create META-INF");
        fs::write(meta.join(tier.file_name()), content).expect("write tier file");
        self
    }

    pub fn with_baseline<N: AsRef<str>, V: AsRef<str>>(self, tier: Tier, vars: &[(N, V)]) -> Self {
        self.with_raw_baseline(tier, &substvar_xml(vars))
    }

    pub fn with_raw_baseline(self, tier: Tier, content: &str) -> Self {
        fs::write(self.baseline_path(tier), content).expect("write baseline");
        self
    }

    /// Give the same variables to the tier file and its baseline
    pub fn with_consistent_tier<N: AsRef<str>, V: AsRef<str>>(self, tier: Tier, vars: &[(N, V)]) -> Self {
        self.with_tier_file(tier, vars).with_baseline(tier, vars)
    }

    /// Configuration reading baselines from the workspace's `gv` folder
    pub fn config(&self) -> PreflightConfig {
        PreflightConfig {
            baseline_dir: Some(self.baseline_dir()),
            ..PreflightConfig::default()
        }
    }

    /// Configuration validating only `tiers`
    pub fn config_for(&self, tiers: &[Tier]) -> PreflightConfig {
        PreflightConfig {
            selected: tiers.to_vec(),
            ..self.config()
        }
    }
}
