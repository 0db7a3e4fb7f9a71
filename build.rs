use std::process::Command;

fn main() {
    // Rebuild CSS when templates or the source stylesheet change
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=templates/");

    // Try to run Tailwind CSS standalone CLI
    let status = Command::new("tailwindcss")
        .args([
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            // Tailwind CLI not available, write the hand-maintained subset
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            let fallback = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #1c1917; background: #fafaf9; -webkit-font-smoothing: antialiased; }
img { display: block; max-width: 100%; }
a { color: inherit; text-decoration: none; }
a:hover { opacity: 0.8; }
.min-h-screen { min-height: 100vh; }
.mx-auto { margin-left: auto; margin-right: auto; }
.max-w-6xl { max-width: 72rem; }
.max-w-4xl { max-width: 56rem; }
.max-w-xl { max-width: 36rem; }
.max-w-md { max-width: 28rem; }
.px-4 { padding-left: 1rem; padding-right: 1rem; }
.py-3 { padding-top: 0.75rem; padding-bottom: 0.75rem; }
.py-6 { padding-top: 1.5rem; padding-bottom: 1.5rem; }
.py-8 { padding-top: 2rem; padding-bottom: 2rem; }
.py-16 { padding-top: 4rem; padding-bottom: 4rem; }
.mb-2 { margin-bottom: 0.5rem; }
.mb-4 { margin-bottom: 1rem; }
.mb-8 { margin-bottom: 2rem; }
.mt-1 { margin-top: 0.25rem; }
.mt-4 { margin-top: 1rem; }
.ml-auto { margin-left: auto; }
.flex { display: flex; }
.items-center { align-items: center; }
.justify-center { justify-content: center; }
.justify-between { justify-content: space-between; }
.gap-3 { gap: 0.75rem; }
.gap-4 { gap: 1rem; }
.text-center { text-align: center; }
.text-xs { font-size: 0.75rem; }
.text-sm { font-size: 0.875rem; }
.text-lg { font-size: 1.125rem; }
.text-xl { font-size: 1.25rem; }
.text-4xl { font-size: 2.25rem; }
.font-medium { font-weight: 500; }
.font-semibold { font-weight: 600; }
.font-bold { font-weight: 700; }
.text-stone-500 { color: #78716c; }
.text-stone-600 { color: #57534e; }
.text-stone-700 { color: #44403c; }
.text-stone-900 { color: #1c1917; }
.bg-white { background-color: #fff; }
.bg-stone-50 { background-color: #fafaf9; }
.border-b { border-bottom: 1px solid; }
.border-t { border-top: 1px solid; }
.border-stone-100 { border-color: #f5f5f4; }
.border-stone-200 { border-color: #e7e5e4; }
.whitespace-pre-wrap { white-space: pre-wrap; }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.5rem 1rem; border-radius: 0.5rem; font-size: 0.875rem; font-weight: 500; cursor: pointer; border: none; }
.btn-primary { background: #1c1917; color: #fff; }
.btn-secondary { background: #fff; color: #1c1917; border: 1px solid #d6d3d1; }
.btn-danger { background: #dc2626; color: #fff; }
.btn.disabled { opacity: 0.5; pointer-events: none; }
.card { background: #fff; border-radius: 0.75rem; border: 1px solid #e7e5e4; padding: 1.5rem; box-shadow: 0 1px 2px 0 rgb(0 0 0 / 0.05); }
.input { width: 100%; border: 1px solid #d6d3d1; border-radius: 0.5rem; padding: 0.5rem 0.75rem; font: inherit; }
.form label { display: block; font-size: 0.875rem; font-weight: 500; margin: 0.75rem 0 0.25rem; }
.field-error { color: #dc2626; font-size: 0.875rem; margin-top: 0.25rem; }
.alert { border-radius: 0.5rem; padding: 0.75rem 1rem; font-size: 0.875rem; }
.alert-error { background: #fef2f2; color: #b91c1c; border: 1px solid #fecaca; }
.alert-success { background: #f0fdf4; color: #166534; border: 1px solid #bbf7d0; }
.nav-link { font-size: 0.875rem; color: #57534e; }
.nav-link.active { color: #1c1917; font-weight: 600; }
.grid { display: grid; gap: 1rem; }
.grid-photos { grid-template-columns: repeat(auto-fill, minmax(14rem, 1fr)); }
.grid-albums { grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr)); }
.photo-card, .album-card { display: block; background: #fff; border: 1px solid #e7e5e4; border-radius: 0.75rem; overflow: hidden; }
.thumb { position: relative; aspect-ratio: 1; background: #f5f5f4; }
.thumb img { width: 100%; height: 100%; object-fit: cover; }
.card-body { padding: 0.75rem; }
.badge { position: absolute; top: 0.5rem; left: 0.5rem; background: #fbbf24; border-radius: 9999px; padding: 0 0.5rem; font-size: 0.75rem; font-weight: 600; }
.tags { display: flex; flex-wrap: wrap; gap: 0.25rem; }
.tag { background: #f5f5f4; border-radius: 9999px; padding: 0 0.5rem; font-size: 0.75rem; color: #57534e; }
.pager { display: flex; justify-content: center; align-items: center; gap: 0.5rem; margin-top: 2rem; }
.detail { display: grid; gap: 2rem; grid-template-columns: 2fr 1fr; }
.photo-frame { position: relative; }
.overlay { position: absolute; bottom: 0.5rem; right: 0.5rem; background: rgb(0 0 0 / 0.6); color: #fff; font-size: 0.75rem; padding: 0 0.5rem; border-radius: 0.25rem; }
.info { display: grid; grid-template-columns: auto 1fr; gap: 0.25rem 1rem; font-size: 0.875rem; }
.info dt { color: #78716c; }
.album-header { display: flex; gap: 1.5rem; }
.album-cover { width: 12rem; height: 12rem; object-fit: cover; border-radius: 0.75rem; }
.picker { display: grid; gap: 0.5rem; grid-template-columns: repeat(auto-fill, minmax(7rem, 1fr)); }
.picker-item { display: block; border: 2px solid transparent; border-radius: 0.5rem; padding: 0.25rem; cursor: pointer; }
.picker-item.selected { border-color: #1c1917; }
.picker-item img { aspect-ratio: 1; width: 100%; object-fit: cover; }
.avatar { width: 5rem; height: 5rem; border-radius: 9999px; object-fit: cover; flex-shrink: 0; }
.avatar-empty { background: #e7e5e4; display: flex; align-items: center; justify-content: center; font-size: 0.75rem; overflow: hidden; }
"#;
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", fallback).ok();
        }
    }
}
