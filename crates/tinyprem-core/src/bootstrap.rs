//! Browser script that re-initialises CMS editors with the premium options.
//!
//! The page already creates TinyMCE instances for every
//! `textarea.htmleditor[data-editor="tinyMCE"]`. On window load this script
//! hooks those textareas through jQuery entwine, merges the options object
//! into each editor's settings, then destroys and re-creates the editor.

use crate::error::PremiumError;
use crate::options::OptionSet;
use crate::script;

const OPTIONS_SLOT: &str = "__TINYPREM_OPTIONS__";

const TEMPLATE: &str = r#"function initialiseTinyMCEPremium(options) {
    if (typeof jQuery === 'undefined') {
        console.error('TinyMCE Premium: jQuery is not defined, cannot load TinyMCE Premium');
        return;
    }

    if (typeof tinymce === 'undefined') {
        console.error('TinyMCE Premium: TinyMCE is not defined, cannot load TinyMCE Premium');
        return;
    }

    console.log('TinyMCE Premium: Initialising TinyMCE Premium');

    jQuery.entwine('ss', function (jQuery) {
        jQuery('textarea.htmleditor[data-editor="tinyMCE"]').entwine({
            onmatch: function () {
                this._super();

                var id = this.attr('id');
                var editor = tinymce.get(id);

                if (editor === null) {
                    console.warn('TinyMCE Premium: Could not find editor ' + id);
                    return;
                }

                if (!(editor instanceof tinymce.Editor)) {
                    console.warn('TinyMCE Premium: Editor ' + id + ' is not a TinyMCE editor');
                    return;
                }

                var settings;
                try {
                    settings = jQuery.extend(editor.settings, options);
                } catch (e) {
                    console.error('TinyMCE Premium: Could not apply options to editor ' + id);
                    console.error(e);
                    return;
                }

                try {
                    editor.destroy();
                    tinymce.init(settings);
                } catch (e) {
                    console.error('TinyMCE Premium: Could not re-initialise editor ' + id);
                    console.error(e);
                }
            }
        });
    });
}

window.addEventListener('load', initialiseTinyMCEPremium.bind(null, __TINYPREM_OPTIONS__));
"#;

/// Fills the template with an already-rendered options expression.
pub fn render_bootstrap_script(options_expr: &str) -> String {
    TEMPLATE.replacen(OPTIONS_SLOT, options_expr, 1)
}

/// Renders `options` into the template, minified unless `minify` is false.
///
/// A minification failure fails the whole script; no partial output.
pub fn render(options: &OptionSet, minify: bool) -> Result<String, PremiumError> {
    let js = render_bootstrap_script(&options.render());
    if !minify {
        return Ok(js);
    }
    script::minify(&js).map_err(|e| {
        tracing::error!("bootstrap script minification failed: {}", e);
        PremiumError::MinifyFailed(e)
    })
}
