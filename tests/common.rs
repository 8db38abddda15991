use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use tempfile::TempDir;

pub struct TestRepo {
  pub repo_path: TempDir
}

impl Default for TestRepo {
  fn default() -> Self {
    let repo_path = TempDir::new().unwrap();

    let output = Command::new("git")
      .arg("init")
      .current_dir(repo_path.path())
      .output()
      .expect("Failed to execute git init");
    assert!(output.status.success());

    for (key, value) in [("user.name", "Test User"), ("user.email", "test@example.com")] {
      let output = Command::new("git")
        .args(["config", key, value])
        .current_dir(repo_path.path())
        .output()
        .unwrap();
      assert!(output.status.success());
    }

    Self { repo_path }
  }
}

impl TestRepo {
  pub fn path(&self) -> &Path {
    self.repo_path.path()
  }

  pub fn create_file(&self, name: &str, content: &str) -> Result<PathBuf> {
    let file_path = self.path().join(name);
    std::fs::write(&file_path, content)?;
    Ok(file_path)
  }

  pub fn stage(&self, name: &str) -> Result<()> {
    let output = Command::new("git")
      .args(["add", name])
      .current_dir(self.path())
      .output()?;
    assert!(output.status.success());
    Ok(())
  }

  pub fn commit(&self, message: &str) -> Result<()> {
    let output = Command::new("git")
      .args(["commit", "--no-gpg-sign", "-m", message])
      .current_dir(self.path())
      .output()?;
    assert!(output.status.success());
    Ok(())
  }
}
