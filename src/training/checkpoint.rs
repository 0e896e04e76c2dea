/// Model checkpointing with safetensors
///
/// A checkpoint is the flat set of named weight tensors held by the model's
/// `VarMap`, nothing else. Loading requires a model of the same architecture
/// so the variable names line up.
use candle_nn::VarMap;
use safetensors::SafeTensors;
use std::fs;
use std::path::Path;

/// Save all model weights to a safetensors file
///
/// Parent directories are created as needed; an existing file is
/// overwritten.
pub fn save_weights<P: AsRef<Path>>(varmap: &VarMap, path: P) -> crate::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    varmap.save(path)?;
    Ok(())
}

/// Load weights from a checkpoint into an existing model's `VarMap`
pub fn load_weights<P: AsRef<Path>>(varmap: &mut VarMap, path: P) -> crate::Result<()> {
    varmap.load(path.as_ref())?;
    Ok(())
}

/// List the tensor names stored in a checkpoint file
pub fn tensor_names<P: AsRef<Path>>(path: P) -> crate::Result<Vec<String>> {
    let data = fs::read(path.as_ref())?;
    let tensors = SafeTensors::deserialize(&data).map_err(|e| {
        crate::TrainError::Checkpoint(format!("invalid checkpoint {:?}: {}", path.as_ref(), e))
    })?;
    let mut names: Vec<String> = tensors.names().into_iter().map(String::from).collect();
    names.sort();
    Ok(names)
}
